// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the EventStore trait.
//!
//! The non-durable variant: the full history lives in a `Vec` behind one
//! async mutex, so storage failures cannot occur and read-after-write
//! consistency is trivial. History does not survive a restart.

use async_trait::async_trait;
use tokio::sync::Mutex;

use devmate_core::event::{clamp_monotonic, generate_event_id, now_timestamp};
use devmate_core::{DevmateError, Event, EventKind, EventStore, NewEvent, StatsSnapshot};

#[derive(Default)]
struct MemoryInner {
    events: Vec<Event>,
    last_ts: String,
}

/// Event store backed by process memory.
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn record(&self, raw: NewEvent) -> Result<Event, DevmateError> {
        let mut inner = self.inner.lock().await;
        let ts = clamp_monotonic(&inner.last_ts, now_timestamp());
        let event = Event {
            id: generate_event_id(),
            kind: raw.kind,
            payload: raw.payload,
            ts: ts.clone(),
        };
        inner.events.push(event.clone());
        inner.last_ts = ts;
        Ok(event)
    }

    async fn stats(&self) -> Result<StatsSnapshot, DevmateError> {
        let inner = self.inner.lock().await;
        Ok(StatsSnapshot::tally(&inner.events))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Event>, DevmateError> {
        let inner = self.inner.lock().await;
        let start = inner.events.len().saturating_sub(limit);
        Ok(inner.events[start..].to_vec())
    }

    async fn recent_of(
        &self,
        kinds: &[EventKind],
        limit: usize,
    ) -> Result<Vec<Event>, DevmateError> {
        let inner = self.inner.lock().await;
        let mut matched: Vec<Event> = inner
            .events
            .iter()
            .rev()
            .filter(|e| kinds.contains(&e.kind))
            .take(limit)
            .cloned()
            .collect();
        matched.reverse();
        Ok(matched)
    }
}
