// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API webhook payload types.
//!
//! Meta wraps each delivery in `entry[].changes[].value.messages[]`; only
//! text messages are interpreted. Unknown fields are ignored rather than
//! rejected -- the webhook payload schema is Meta's, not ours.

use serde::Deserialize;

/// Top-level webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// One webhook entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// One change within an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

/// The value object carrying delivered messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

/// One inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Sender phone number.
    pub from: String,
    /// Text body, present for text messages only.
    #[serde(default)]
    pub text: Option<TextBody>,
}

/// Text message body.
#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// A parsed inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    /// Sender phone number (the reply target).
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// Extract the first inbound text message from a webhook payload, if any.
///
/// Status updates, media messages, and malformed payloads yield `None`.
pub fn parse_inbound(payload: &serde_json::Value) -> Option<InboundText> {
    let payload: WebhookPayload = serde_json::from_value(payload.clone()).ok()?;
    let message = payload
        .entry
        .first()?
        .changes
        .first()?
        .value
        .messages
        .first()?
        .clone();
    let text = message.text?;
    Some(InboundText {
        sender: message.from,
        text: text.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_payload(from: &str, body: &str) -> serde_json::Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "entry-1",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "messages": [{
                            "from": from,
                            "id": "wamid.test",
                            "timestamp": "1700000000",
                            "type": "text",
                            "text": {"body": body}
                        }]
                    }
                }]
            }]
        })
    }

    #[test]
    fn parses_text_message() {
        let parsed = parse_inbound(&text_payload("+15551234", "find my report")).unwrap();
        assert_eq!(parsed.sender, "+15551234");
        assert_eq!(parsed.text, "find my report");
    }

    #[test]
    fn status_update_yields_none() {
        let payload = json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [{"id": "wamid.x", "status": "delivered"}]
                    }
                }]
            }]
        });
        assert!(parse_inbound(&payload).is_none());
    }

    #[test]
    fn non_text_message_yields_none() {
        let payload = json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "+15551234",
                            "type": "image",
                            "image": {"id": "media-1"}
                        }]
                    }
                }]
            }]
        });
        assert!(parse_inbound(&payload).is_none());
    }

    #[test]
    fn malformed_payload_yields_none() {
        assert!(parse_inbound(&json!({"unexpected": true})).is_none());
        assert!(parse_inbound(&json!("not an object")).is_none());
        assert!(parse_inbound(&json!({"entry": []})).is_none());
    }
}
