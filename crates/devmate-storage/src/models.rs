// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical event types are defined in `devmate-core::event` for use
//! across crate boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use devmate_core::event::{Event, EventKind, NewEvent, StatsSnapshot};
