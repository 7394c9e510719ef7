// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the DevMate assistant.
//!
//! This crate provides the error type, the event data model, and the
//! [`EventStore`] trait shared by every other crate in the workspace.

pub mod error;
pub mod event;
pub mod request;
pub mod store;

// Re-export key items at crate root for ergonomic imports.
pub use error::DevmateError;
pub use event::{Event, EventKind, NewEvent, StatsSnapshot};
pub use request::InboundRequest;
pub use store::EventStore;
