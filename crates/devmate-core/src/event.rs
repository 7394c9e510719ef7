// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event data model shared by producers, the store, and the hub.
//!
//! An [`Event`] is an immutable record of something that happened in the
//! system: an inbound WhatsApp message, an outbound reply, a delivered file,
//! an error, or any free-form lifecycle tag a producer chooses to emit.
//! Producers hand the hub a [`NewEvent`]; the store assigns the `id` and
//! `ts` fields and returns the canonical [`Event`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The kind of an event.
///
/// The four known kinds drive the derived counters; everything else is
/// carried through verbatim as [`EventKind::Other`] so producers can emit
/// new tags without a schema change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An inbound user message.
    Message,
    /// An outbound reply to the user.
    Reply,
    /// A file delivered to the user (directly or via a share link).
    FileSent,
    /// A failure surfaced by a producer.
    Error,
    /// Any other producer-supplied tag (`agent_thinking`, `tool_call`, ...).
    #[serde(untagged)]
    Other(String),
}

impl EventKind {
    /// The wire/storage tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Message => "message",
            EventKind::Reply => "reply",
            EventKind::FileSent => "file_sent",
            EventKind::Error => "error",
            EventKind::Other(tag) => tag,
        }
    }

    /// Parse a tag back into a kind. Unknown tags become [`EventKind::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "message" => EventKind::Message,
            "reply" => EventKind::Reply,
            "file_sent" => EventKind::FileSent,
            "error" => EventKind::Error,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, timestamped, typed event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Short unique token assigned at ingestion (`ev_` + 12 hex chars).
    pub id: String,
    /// Event kind tag.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Producer-defined fields, carried through verbatim.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// ISO-8601 UTC ingestion timestamp, non-decreasing across the store.
    pub ts: String,
}

/// A raw producer-side event, before the store assigns `id` and `ts`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Event kind tag.
    pub kind: EventKind,
    /// Producer-defined fields.
    pub payload: Map<String, Value>,
}

impl NewEvent {
    /// Create a new raw event with the given kind and payload.
    pub fn new(kind: EventKind, payload: Map<String, Value>) -> Self {
        Self { kind, payload }
    }

    /// Create a raw event with a kind and no payload.
    pub fn of_kind(kind: EventKind) -> Self {
        Self {
            kind,
            payload: Map::new(),
        }
    }

    /// Build a raw event from arbitrary producer JSON.
    ///
    /// The `type` field is split off into the kind; a missing or non-string
    /// `type` maps to `Other("unknown")` and the rest of the object is still
    /// recorded verbatim as the payload. Non-object values are wrapped under
    /// a `"value"` key. Producer-supplied `id`/`ts` fields stay in the
    /// payload; the canonical ones are assigned by the store.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                let kind = match map.get("type") {
                    Some(Value::String(tag)) => {
                        let kind = EventKind::from_tag(tag);
                        map.remove("type");
                        kind
                    }
                    _ => EventKind::Other("unknown".to_string()),
                };
                Self { kind, payload: map }
            }
            other => {
                let mut payload = Map::new();
                payload.insert("value".to_string(), other);
                Self {
                    kind: EventKind::Other("unknown".to_string()),
                    payload,
                }
            }
        }
    }
}

/// Derived counters computed over the full event history.
///
/// Counters only ever grow for the lifetime of the underlying store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Count of `message` events.
    pub total: u64,
    /// Count of `file_sent` events delivered directly (method absent or "direct").
    pub direct: u64,
    /// Count of `file_sent` events delivered via a share link.
    pub drive: u64,
    /// Count of `error` events.
    pub failed: u64,
}

impl StatsSnapshot {
    /// Fold one event into the counters.
    ///
    /// Unrecognized kinds contribute to no counter. A `file_sent` event
    /// without a `method` payload field counts as a direct delivery.
    pub fn observe(&mut self, event: &Event) {
        match &event.kind {
            EventKind::Message => self.total += 1,
            EventKind::FileSent => {
                match event.payload.get("method").and_then(Value::as_str) {
                    None | Some("direct") => self.direct += 1,
                    Some(_) => self.drive += 1,
                }
            }
            EventKind::Error => self.failed += 1,
            EventKind::Reply | EventKind::Other(_) => {}
        }
    }

    /// Compute counters from scratch over an event sequence.
    pub fn tally<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.observe(event);
        }
        stats
    }
}

/// Generate a short unique event id (`ev_` + 12 hex chars of a v4 UUID).
///
/// The store additionally enforces uniqueness with a UNIQUE constraint.
pub fn generate_event_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("ev_{}", &hex[..12])
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Clamp a fresh timestamp against the previous record's timestamp.
///
/// Timestamps share a fixed-width UTC format, so lexicographic comparison
/// matches chronological order; clamping keeps the store's timestamp order
/// identical to insertion order across wall-clock steps.
pub fn clamp_monotonic(prev: &str, now: String) -> String {
    if now.as_str() < prev {
        prev.to_string()
    } else {
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: EventKind, payload: Value) -> Event {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Event {
            id: generate_event_id(),
            kind,
            payload,
            ts: now_timestamp(),
        }
    }

    #[test]
    fn event_kind_known_tags_round_trip() {
        for tag in ["message", "reply", "file_sent", "error"] {
            let kind = EventKind::from_tag(tag);
            assert_eq!(kind.as_str(), tag);
            let json = serde_json::to_value(&kind).unwrap();
            assert_eq!(json, tag);
            let parsed: EventKind = serde_json::from_value(json).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn event_kind_other_round_trips() {
        let kind = EventKind::from_tag("agent_thinking");
        assert_eq!(kind, EventKind::Other("agent_thinking".to_string()));
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json, "agent_thinking");
        let parsed: EventKind = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn event_serializes_kind_under_type_key() {
        let ev = event(EventKind::Message, json!({"text": "hi"}));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["payload"]["text"], "hi");
        assert!(json["id"].as_str().unwrap().starts_with("ev_"));
    }

    #[test]
    fn new_event_from_json_splits_type() {
        let raw = NewEvent::from_json(json!({"type": "message", "text": "hi", "sender": "+1555"}));
        assert_eq!(raw.kind, EventKind::Message);
        assert_eq!(raw.payload["text"], "hi");
        assert!(!raw.payload.contains_key("type"));
    }

    #[test]
    fn new_event_from_json_missing_type_is_unknown() {
        let raw = NewEvent::from_json(json!({"text": "no type here"}));
        assert_eq!(raw.kind, EventKind::Other("unknown".to_string()));
        assert_eq!(raw.payload["text"], "no type here");
    }

    #[test]
    fn new_event_from_json_non_string_type_kept_in_payload() {
        let raw = NewEvent::from_json(json!({"type": 42, "text": "odd"}));
        assert_eq!(raw.kind, EventKind::Other("unknown".to_string()));
        // The invalid type field is preserved verbatim.
        assert_eq!(raw.payload["type"], 42);
    }

    #[test]
    fn new_event_from_json_non_object_wrapped() {
        let raw = NewEvent::from_json(json!("just a string"));
        assert_eq!(raw.kind, EventKind::Other("unknown".to_string()));
        assert_eq!(raw.payload["value"], "just a string");
    }

    #[test]
    fn stats_count_messages_and_errors() {
        let events = [
            event(EventKind::Message, json!({})),
            event(EventKind::Message, json!({})),
            event(EventKind::Error, json!({})),
            event(EventKind::Reply, json!({})),
        ];
        let stats = StatsSnapshot::tally(&events);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.direct, 0);
        assert_eq!(stats.drive, 0);
    }

    #[test]
    fn stats_file_sent_method_split() {
        let events = [
            event(EventKind::FileSent, json!({"method": "direct"})),
            event(EventKind::FileSent, json!({"method": "drive"})),
            event(EventKind::FileSent, json!({})),
        ];
        let stats = StatsSnapshot::tally(&events);
        // Missing method defaults to direct.
        assert_eq!(stats.direct, 2);
        assert_eq!(stats.drive, 1);
    }

    #[test]
    fn stats_unrecognized_kind_counts_nothing() {
        let events = [event(EventKind::Other("tool_call".to_string()), json!({}))];
        let stats = StatsSnapshot::tally(&events);
        assert_eq!(stats, StatsSnapshot::default());
    }

    #[test]
    fn event_ids_are_short_and_unique() {
        let a = generate_event_id();
        let b = generate_event_id();
        assert_eq!(a.len(), 15);
        assert_ne!(a, b);
    }

    #[test]
    fn clamp_monotonic_never_goes_backwards() {
        let prev = "2026-03-01T12:00:00.500Z";
        let earlier = "2026-03-01T11:59:59.000Z".to_string();
        let later = "2026-03-01T12:00:01.000Z".to_string();
        assert_eq!(clamp_monotonic(prev, earlier), prev);
        assert_eq!(clamp_monotonic(prev, later.clone()), later);
    }
}
