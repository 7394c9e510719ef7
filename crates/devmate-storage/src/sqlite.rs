// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the EventStore trait.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use devmate_config::model::StorageConfig;
use devmate_core::event::{clamp_monotonic, generate_event_id, now_timestamp};
use devmate_core::{DevmateError, Event, EventKind, EventStore, NewEvent, StatsSnapshot};

use crate::database::Database;
use crate::queries;

/// SQLite-backed event store.
///
/// Wraps a [`Database`] handle and delegates query operations to the typed
/// query module. `record` holds a lock across id/timestamp assignment and
/// the append so concurrent ingestion cannot interleave a single event's
/// fields, and so timestamp order matches insertion order.
pub struct SqliteEventStore {
    db: Database,
    last_ts: Mutex<String>,
}

impl SqliteEventStore {
    /// Open the store at the configured path, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, DevmateError> {
        let db = Database::open(&config.database_path).await?;
        debug!(path = %config.database_path, "SQLite event store opened");
        Ok(Self {
            db,
            last_ts: Mutex::new(String::new()),
        })
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), DevmateError> {
        self.db.close().await
    }

    /// Total number of recorded events (test/diagnostic helper).
    pub async fn count(&self) -> Result<u64, DevmateError> {
        queries::events::count_events(&self.db).await
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn record(&self, raw: NewEvent) -> Result<Event, DevmateError> {
        let mut last_ts = self.last_ts.lock().await;
        let ts = clamp_monotonic(&last_ts, now_timestamp());
        let event = Event {
            id: generate_event_id(),
            kind: raw.kind,
            payload: raw.payload,
            ts: ts.clone(),
        };
        queries::events::insert_event(&self.db, &event).await?;
        *last_ts = ts;
        Ok(event)
    }

    async fn stats(&self) -> Result<StatsSnapshot, DevmateError> {
        queries::events::stats(&self.db).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Event>, DevmateError> {
        queries::events::recent_events(&self.db, limit).await
    }

    async fn recent_of(
        &self,
        kinds: &[EventKind],
        limit: usize,
    ) -> Result<Vec<Event>, DevmateError> {
        queries::events::recent_events_of(&self.db, kinds, limit).await
    }
}
