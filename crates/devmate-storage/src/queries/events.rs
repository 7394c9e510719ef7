// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event history queries: append, recent windows, derived counters.

use devmate_core::DevmateError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Event, EventKind, StatsSnapshot};

/// Append an event. The caller has already assigned `id` and `ts`.
pub async fn insert_event(db: &Database, event: &Event) -> Result<(), DevmateError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| {
            let payload = serde_json::to_string(&event.payload)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            conn.execute(
                "INSERT INTO events (id, kind, payload, ts) VALUES (?1, ?2, ?3, ?4)",
                params![event.id, event.kind.as_str(), payload, event.ts],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent `limit` events, oldest-to-newest.
///
/// Reads newest-first by insertion order, then reverses, so snapshots larger
/// than any in-process window come straight from durable storage.
pub async fn recent_events(db: &Database, limit: usize) -> Result<Vec<Event>, DevmateError> {
    let limit = limit as i64;
    let mut events = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, payload, ts FROM events
                 ORDER BY seq DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_event)?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    events.reverse();
    Ok(events)
}

/// The most recent `limit` events of the given kinds, oldest-to-newest.
pub async fn recent_events_of(
    db: &Database,
    kinds: &[EventKind],
    limit: usize,
) -> Result<Vec<Event>, DevmateError> {
    let tags: Vec<&str> = kinds.iter().map(EventKind::as_str).collect();
    let tags_json = serde_json::to_string(&tags).map_err(|e| DevmateError::Storage {
        source: Box::new(e),
    })?;
    let limit = limit as i64;

    let mut events = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, payload, ts FROM events
                 WHERE kind IN (SELECT value FROM json_each(?1))
                 ORDER BY seq DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![tags_json, limit], row_to_event)?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    events.reverse();
    Ok(events)
}

/// Derived counters over the full event history.
///
/// Mirrors [`StatsSnapshot::observe`]: `total` counts messages, `failed`
/// counts errors, and `file_sent` splits on `payload.method` with a missing
/// method counting as a direct delivery.
pub async fn stats(db: &Database) -> Result<StatsSnapshot, DevmateError> {
    db.connection()
        .call(|conn| {
            let snapshot = conn.query_row(
                "SELECT
                     COUNT(*) FILTER (WHERE kind = 'message'),
                     COUNT(*) FILTER (WHERE kind = 'file_sent'
                         AND COALESCE(json_extract(payload, '$.method'), 'direct') = 'direct'),
                     COUNT(*) FILTER (WHERE kind = 'file_sent'
                         AND json_extract(payload, '$.method') IS NOT NULL
                         AND json_extract(payload, '$.method') != 'direct'),
                     COUNT(*) FILTER (WHERE kind = 'error')
                 FROM events",
                [],
                |row| {
                    Ok(StatsSnapshot {
                        total: row.get::<_, i64>(0)? as u64,
                        direct: row.get::<_, i64>(1)? as u64,
                        drive: row.get::<_, i64>(2)? as u64,
                        failed: row.get::<_, i64>(3)? as u64,
                    })
                },
            )?;
            Ok(snapshot)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of rows in the events table.
pub async fn count_events(db: &Database) -> Result<u64, DevmateError> {
    db.connection()
        .call(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Map a `(id, kind, payload, ts)` row to an [`Event`].
fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let kind: String = row.get(1)?;
    let payload: String = row.get(2)?;
    let payload = serde_json::from_str(&payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Event {
        id: row.get(0)?,
        kind: EventKind::from_tag(&kind),
        payload,
        ts: row.get(3)?,
    })
}
