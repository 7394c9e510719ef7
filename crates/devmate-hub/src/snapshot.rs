// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot assembly for newly connected subscribers.

use tracing::warn;

use devmate_core::{EventKind, EventStore, StatsSnapshot};

use crate::frame::Frame;

/// Feed window sizes for snapshot assembly.
#[derive(Debug, Clone, Copy)]
pub struct FeedWindows {
    /// Generic event feed.
    pub events: usize,
    /// Conversation sub-feed (`message` + `reply`).
    pub conversations: usize,
    /// File delivery sub-feed (`file_sent`).
    pub files: usize,
}

impl Default for FeedWindows {
    fn default() -> Self {
        Self {
            events: 200,
            conversations: 100,
            files: 100,
        }
    }
}

/// Assemble the init frame for a new subscriber.
///
/// A store failure on any feed degrades that feed to empty rather than
/// failing the connection; `fallback_stats` stands in when the counters are
/// unreadable.
pub async fn assemble(
    store: &dyn EventStore,
    windows: &FeedWindows,
    fallback_stats: StatsSnapshot,
) -> Frame {
    let events = match store.recent(windows.events).await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "snapshot event feed unavailable");
            Vec::new()
        }
    };

    let conversations = match store
        .recent_of(&[EventKind::Message, EventKind::Reply], windows.conversations)
        .await
    {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "snapshot conversation feed unavailable");
            Vec::new()
        }
    };

    let files = match store.recent_of(&[EventKind::FileSent], windows.files).await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "snapshot file feed unavailable");
            Vec::new()
        }
    };

    let stats = match store.stats().await {
        Ok(stats) => stats,
        Err(e) => {
            warn!(error = %e, "snapshot stats unavailable, using last known");
            fallback_stats
        }
    };

    Frame::Init {
        events,
        conversations,
        files,
        stats,
    }
}
