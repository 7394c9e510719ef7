// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort lifecycle event emission into the hub.

use serde_json::{Map, Value};
use tracing::warn;

use devmate_core::{EventKind, NewEvent};
use devmate_hub::BroadcastHub;

/// Record a lifecycle event. Emission failures are logged, never raised --
/// observability must not break the request path.
pub(crate) async fn emit(hub: &BroadcastHub, kind: EventKind, payload: Value) {
    let payload = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Err(e) = hub.ingest(NewEvent::new(kind, payload)).await {
        warn!(error = %e, "failed to record lifecycle event");
    }
}

/// Shorthand for free-form producer tags.
pub(crate) async fn emit_tag(hub: &BroadcastHub, tag: &str, payload: Value) {
    emit(hub, EventKind::Other(tag.to_string()), payload).await;
}
