// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event persistence for the DevMate assistant.
//!
//! Provides a WAL-mode SQLite event store with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`, plus an in-memory
//! variant for non-durable deployments and tests.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryEventStore;
pub use models::*;
pub use sqlite::SqliteEventStore;
