// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live event broadcast and aggregation hub.
//!
//! Request-handling tasks feed typed events into the [`BroadcastHub`]; the
//! hub persists each event, recomputes the derived counters, and pushes an
//! incremental frame to every registered dashboard subscriber. New
//! subscribers are seeded with a full snapshot before going live, and idle
//! connections are probed by the keep-alive loop.

pub mod frame;
pub mod hub;
pub mod keepalive;
pub mod registry;
pub mod snapshot;

pub use frame::Frame;
pub use hub::BroadcastHub;
pub use registry::{SubscriberRegistry, SUBSCRIBER_BUFFER};
pub use snapshot::FeedWindows;
