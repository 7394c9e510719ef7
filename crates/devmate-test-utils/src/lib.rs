// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for DevMate integration tests.

pub mod failing_store;
pub mod harness;
pub mod subscriber;

pub use failing_store::FailingStore;
pub use harness::TestHarness;
pub use subscriber::{attach_dead_subscriber, CollectingSubscriber};
