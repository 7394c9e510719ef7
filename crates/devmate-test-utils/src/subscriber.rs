// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process subscribers for hub tests, standing in for real WebSocket
//! connections.

use tokio::sync::mpsc;

use devmate_hub::{BroadcastHub, Frame, SUBSCRIBER_BUFFER};

/// A registered subscriber that collects the frames it receives.
pub struct CollectingSubscriber {
    /// Connection id in the registry.
    pub id: String,
    rx: mpsc::Receiver<String>,
}

impl CollectingSubscriber {
    /// Register a collecting subscriber under the given id.
    ///
    /// Mirrors the gateway's discipline: the caller should take a snapshot
    /// first if it wants one; registration only enables incremental frames.
    pub fn attach(hub: &BroadcastHub, id: impl Into<String>) -> Self {
        let id = id.into();
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        hub.registry().add(id.clone(), tx);
        Self { id, rx }
    }

    /// Await the next frame.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        let text = self.rx.recv().await?;
        serde_json::from_str(&text).ok()
    }

    /// The next already-delivered frame, if any.
    pub fn try_frame(&mut self) -> Option<Frame> {
        let text = self.rx.try_recv().ok()?;
        serde_json::from_str(&text).ok()
    }
}

/// Register a subscriber whose sends always fail (receiver dropped).
///
/// Returns the connection id so tests can assert on pruning.
pub fn attach_dead_subscriber(hub: &BroadcastHub, id: impl Into<String>) -> String {
    let id = id.into();
    let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
    drop(rx);
    hub.registry().add(id.clone(), tx);
    id
}
