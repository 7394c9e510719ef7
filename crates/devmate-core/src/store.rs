// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event store trait implemented by the SQLite and in-memory backends.

use async_trait::async_trait;

use crate::error::DevmateError;
use crate::event::{Event, EventKind, NewEvent, StatsSnapshot};

/// Append-only event history with derived counters.
///
/// `record` is the only mutation. Within one process, a completed `record`
/// is visible to subsequent `stats`/`recent` calls (read-after-write); no
/// cross-process transaction semantics are promised.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Assign `id` and `ts`, durably append, and return the canonical event.
    ///
    /// A storage failure here surfaces to the producer — an event that
    /// cannot be persisted is never broadcast.
    async fn record(&self, event: NewEvent) -> Result<Event, DevmateError>;

    /// Compute the derived counters over the full history.
    async fn stats(&self) -> Result<StatsSnapshot, DevmateError>;

    /// The most recent `limit` events, oldest-to-newest.
    async fn recent(&self, limit: usize) -> Result<Vec<Event>, DevmateError>;

    /// The most recent `limit` events of the given kinds, oldest-to-newest.
    async fn recent_of(
        &self,
        kinds: &[EventKind],
        limit: usize,
    ) -> Result<Vec<Event>, DevmateError>;
}
