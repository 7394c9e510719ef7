// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of connected dashboard subscribers.
//!
//! Each subscriber is a per-connection `mpsc::Sender<String>` whose receiver
//! side is drained by that connection's forwarder task. The registry is
//! shared across connection handlers and the broadcast path; iteration
//! snapshots the entries first so removal during a broadcast never touches
//! the set being walked.

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Bounded per-subscriber buffer. A subscriber that falls this far behind
/// is treated as dead and pruned on the next broadcast.
pub const SUBSCRIBER_BUFFER: usize = 64;

/// Live subscriber connections, keyed by connection id.
#[derive(Default)]
pub struct SubscriberRegistry {
    senders: DashMap<String, mpsc::Sender<String>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Re-adding an existing id replaces its sender.
    pub fn add(&self, id: impl Into<String>, tx: mpsc::Sender<String>) {
        self.senders.insert(id.into(), tx);
    }

    /// Deregister a subscriber. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) {
        self.senders.remove(id);
    }

    /// Whether the given id is currently registered.
    pub fn contains(&self, id: &str) -> bool {
        self.senders.contains_key(id)
    }

    /// Snapshot of the current subscribers (copy-before-iterate).
    pub fn snapshot(&self) -> Vec<(String, mpsc::Sender<String>)> {
        self.senders
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Whether no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        mpsc::channel(SUBSCRIBER_BUFFER)
    }

    #[test]
    fn add_and_remove() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = subscriber();
        registry.add("conn-1", tx);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("conn-1"));

        registry.remove("conn-1");
        assert!(registry.is_empty());
        assert!(!registry.contains("conn-1"));
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (tx, _rx) = subscriber();
        registry.add("conn-1", tx);

        registry.remove("conn-1");
        registry.remove("conn-1");
        registry.remove("never-added");
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_mutation() {
        let registry = SubscriberRegistry::new();
        let (tx1, _rx1) = subscriber();
        let (tx2, _rx2) = subscriber();
        registry.add("a", tx1);
        registry.add("b", tx2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);

        // Mutating during iteration of the snapshot must not panic or
        // change what was captured.
        for (id, _) in &snapshot {
            registry.remove(id);
        }
        assert!(registry.is_empty());
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_add_remove() {
        let registry = std::sync::Arc::new(SubscriberRegistry::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = std::sync::Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::channel(1);
                let id = format!("conn-{i}");
                registry.add(id.clone(), tx);
                registry.remove(&id);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(registry.is_empty());
    }
}
