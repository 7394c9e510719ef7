// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The broadcast hub: ingest an event, persist it, recompute counters, and
//! fan the update out to every registered subscriber.
//!
//! Sends are one non-blocking attempt per subscriber. A subscriber whose
//! bounded buffer is full or whose receiver is gone is collected during the
//! iteration and removed after it, so a slow or dead connection never blocks
//! ingestion, delivery to others, or the registry walk.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use devmate_core::{DevmateError, Event, EventStore, NewEvent, StatsSnapshot};

use crate::frame::Frame;
use crate::registry::SubscriberRegistry;
use crate::snapshot::{self, FeedWindows};

/// Process-wide fan-out hub.
///
/// Explicitly constructed and passed by handle; lifecycle is tied to the
/// server process.
pub struct BroadcastHub {
    store: Arc<dyn EventStore>,
    registry: SubscriberRegistry,
    windows: FeedWindows,
    /// Last successfully computed counters, used when the store degrades.
    last_stats: Mutex<StatsSnapshot>,
}

impl BroadcastHub {
    /// Create a hub over the given store with the given feed windows.
    pub fn new(store: Arc<dyn EventStore>, windows: FeedWindows) -> Self {
        Self {
            store,
            registry: SubscriberRegistry::new(),
            windows,
            last_stats: Mutex::new(StatsSnapshot::default()),
        }
    }

    /// The subscriber registry for this hub.
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// The underlying event store.
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// The feed windows used for snapshots and the poll fallback.
    pub fn windows(&self) -> &FeedWindows {
        &self.windows
    }

    /// Persist an event, refresh the counters, and push the incremental
    /// frame to every registered subscriber.
    ///
    /// A storage failure on `record` propagates to the producer and nothing
    /// is broadcast. Once recorded, the event is never lost even if every
    /// send fails.
    pub async fn ingest(&self, raw: NewEvent) -> Result<Event, DevmateError> {
        let event = self.store.record(raw).await?;
        let stats = self.refresh_stats().await;

        let frame = Frame::Event {
            data: event.clone(),
            stats,
        };
        let encoded = frame.encode()?;

        let mut dead = Vec::new();
        for (id, tx) in self.registry.snapshot() {
            if tx.try_send(encoded.clone()).is_err() {
                dead.push(id);
            }
        }
        // Removal is deferred until after the iteration completes.
        for id in &dead {
            self.registry.remove(id);
        }
        if !dead.is_empty() {
            warn!(pruned = dead.len(), "removed unreachable subscribers");
        }

        debug!(
            id = %event.id,
            kind = %event.kind,
            subscribers = self.registry.len(),
            "event ingested"
        );
        Ok(event)
    }

    /// Assemble the init frame for a new subscriber.
    ///
    /// Call this BEFORE registering the connection for incremental updates:
    /// an event ingested between the snapshot read and registration is
    /// missed (at most one gap), but a subscriber never sees a duplicate.
    pub async fn snapshot(&self) -> Frame {
        let fallback = *self.last_stats.lock().await;
        let frame = snapshot::assemble(self.store.as_ref(), &self.windows, fallback).await;
        if let Frame::Init { stats, .. } = &frame {
            *self.last_stats.lock().await = *stats;
        }
        frame
    }

    /// Current counters, degrading to the last known snapshot if the store
    /// is unreadable.
    pub async fn current_stats(&self) -> StatsSnapshot {
        self.refresh_stats().await
    }

    async fn refresh_stats(&self) -> StatsSnapshot {
        match self.store.stats().await {
            Ok(stats) => {
                *self.last_stats.lock().await = stats;
                stats
            }
            Err(e) => {
                warn!(error = %e, "stats unavailable, using last known");
                *self.last_stats.lock().await
            }
        }
    }
}
