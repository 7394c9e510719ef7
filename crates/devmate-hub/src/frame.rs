// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire frames pushed to dashboard subscribers.
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "init", "events": [...], "conversations": [...], "files": [...], "stats": {...}}
//! {"type": "event", "data": {...}, "stats": {...}}
//! {"type": "ping"}
//! ```
//!
//! Client -> Server traffic is not interpreted; it only resets the idle
//! timer.

use serde::{Deserialize, Serialize};

use devmate_core::{DevmateError, Event, StatsSnapshot};

/// A server-to-subscriber frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Full state sent once per connection, before incremental updates.
    Init {
        events: Vec<Event>,
        conversations: Vec<Event>,
        files: Vec<Event>,
        stats: StatsSnapshot,
    },
    /// One ingested event plus the counters after it.
    Event { data: Event, stats: StatsSnapshot },
    /// Keep-alive probe for idle connections.
    Ping,
}

impl Frame {
    /// Encode the frame as its JSON wire form.
    pub fn encode(&self) -> Result<String, DevmateError> {
        serde_json::to_string(self)
            .map_err(|e| DevmateError::Internal(format!("frame encoding failed: {e}")))
    }
}
