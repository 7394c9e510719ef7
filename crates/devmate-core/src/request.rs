// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound request handed from the gateway to the agent loop.

use serde::{Deserialize, Serialize};

/// A user message awaiting agent handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRequest {
    /// Request id (uuid), used for log correlation.
    pub id: String,
    /// WhatsApp sender phone number, also the reply target.
    pub sender: String,
    /// Message text.
    pub text: String,
    /// ISO-8601 receipt timestamp.
    pub ts: String,
}

impl InboundRequest {
    /// Build a request for the given sender and text, assigning id and
    /// timestamp.
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            text: text.into(),
            ts: crate::event::now_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_id_and_timestamp() {
        let req = InboundRequest::new("+15551234", "find my report");
        assert!(!req.id.is_empty());
        assert!(req.ts.ends_with('Z'));
        assert_eq!(req.sender, "+15551234");
        assert_eq!(req.text, "find my report");
    }

    #[test]
    fn ids_are_unique() {
        let a = InboundRequest::new("s", "t");
        let b = InboundRequest::new("s", "t");
        assert_ne!(a.id, b.id);
    }
}
