// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Isolated test harness: a hub over a fresh store.
//!
//! Each harness is fully independent (own store, own registry) so tests
//! are order-insensitive and parallel-safe. The SQLite variant lives in a
//! temp dir owned by the harness.

use std::sync::Arc;

use devmate_config::model::StorageConfig;
use devmate_core::{DevmateError, Event, EventStore, NewEvent};
use devmate_hub::{BroadcastHub, FeedWindows};
use devmate_storage::{MemoryEventStore, SqliteEventStore};

/// A hub plus the store backing it, torn down with the harness.
pub struct TestHarness {
    /// The hub under test.
    pub hub: Arc<BroadcastHub>,
    sqlite: Option<Arc<SqliteEventStore>>,
    _tempdir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Start building a harness (in-memory store by default).
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder {
            sqlite: false,
            windows: FeedWindows::default(),
        }
    }

    /// Ingest an arbitrary JSON value the way the `/event` endpoint does.
    pub async fn ingest_json(&self, value: serde_json::Value) -> Result<Event, DevmateError> {
        self.hub.ingest(NewEvent::from_json(value)).await
    }

    /// Checkpoint and close the SQLite store, if one backs this harness.
    pub async fn close(&self) -> Result<(), DevmateError> {
        if let Some(ref sqlite) = self.sqlite {
            sqlite.close().await?;
        }
        Ok(())
    }
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    sqlite: bool,
    windows: FeedWindows,
}

impl TestHarnessBuilder {
    /// Back the harness with a temp-dir SQLite store instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Override the snapshot feed windows.
    pub fn with_windows(mut self, windows: FeedWindows) -> Self {
        self.windows = windows;
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestHarness, DevmateError> {
        if self.sqlite {
            let tempdir = tempfile::tempdir().map_err(|e| DevmateError::Storage {
                source: Box::new(e),
            })?;
            let config = StorageConfig {
                database_path: tempdir
                    .path()
                    .join("harness.db")
                    .display()
                    .to_string(),
                in_memory: false,
            };
            let sqlite = Arc::new(SqliteEventStore::open(&config).await?);
            let store: Arc<dyn EventStore> = Arc::clone(&sqlite) as Arc<dyn EventStore>;
            Ok(TestHarness {
                hub: Arc::new(BroadcastHub::new(store, self.windows)),
                sqlite: Some(sqlite),
                _tempdir: Some(tempdir),
            })
        } else {
            let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
            Ok(TestHarness {
                hub: Arc::new(BroadcastHub::new(store, self.windows)),
                sqlite: None,
                _tempdir: None,
            })
        }
    }
}
