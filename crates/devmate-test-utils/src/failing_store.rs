// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An event store whose operations fail on demand, for error-path tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use devmate_core::{DevmateError, Event, EventKind, EventStore, NewEvent, StatsSnapshot};
use devmate_storage::MemoryEventStore;

/// Wraps a [`MemoryEventStore`] with switchable write and read failures.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryEventStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl FailingStore {
    /// A store that starts out healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `record` calls fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Make subsequent `stats`/`recent` calls fail.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Restore healthy behavior.
    pub fn heal(&self) {
        self.fail_writes.store(false, Ordering::SeqCst);
        self.fail_reads.store(false, Ordering::SeqCst);
    }

    fn error(kind: &str) -> DevmateError {
        DevmateError::Storage {
            source: format!("simulated {kind} failure").into(),
        }
    }
}

#[async_trait]
impl EventStore for FailingStore {
    async fn record(&self, raw: NewEvent) -> Result<Event, DevmateError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::error("write"));
        }
        self.inner.record(raw).await
    }

    async fn stats(&self) -> Result<StatsSnapshot, DevmateError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::error("read"));
        }
        self.inner.stats().await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Event>, DevmateError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::error("read"));
        }
        self.inner.recent(limit).await
    }

    async fn recent_of(
        &self,
        kinds: &[EventKind],
        limit: usize,
    ) -> Result<Vec<Event>, DevmateError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::error("read"));
        }
        self.inner.recent_of(kinds, limit).await
    }
}
