// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp reply tool: the agent's final delivery step.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use devmate_core::{DevmateError, EventKind};
use devmate_hub::BroadcastHub;
use devmate_whatsapp::WhatsAppClient;

use crate::events::emit;
use crate::tool::{Tool, ToolOutput};

/// Sends a WhatsApp text message back to the requesting user.
pub struct SendWhatsAppTool {
    whatsapp: Arc<WhatsAppClient>,
    hub: Arc<BroadcastHub>,
    /// Reply target for this request.
    recipient: String,
}

impl SendWhatsAppTool {
    /// Create a reply tool bound to one request's reply target.
    pub fn new(
        whatsapp: Arc<WhatsAppClient>,
        hub: Arc<BroadcastHub>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            whatsapp,
            hub,
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl Tool for SendWhatsAppTool {
    fn name(&self) -> &str {
        "send_whatsapp_message"
    }

    fn description(&self) -> &str {
        "Send a WhatsApp message back to the user. Use this as the final step \
         to deliver results."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message text to send to the user"
                }
            },
            "required": ["message"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, DevmateError> {
        let Some(message) = input["message"].as_str() else {
            return Ok(ToolOutput::error("missing required 'message' parameter"));
        };

        match self.whatsapp.send_text(&self.recipient, message).await {
            Ok(()) => {
                emit(
                    &self.hub,
                    EventKind::Reply,
                    json!({"to": self.recipient, "text": message}),
                )
                .await;
                Ok(ToolOutput::ok("WhatsApp message sent successfully."))
            }
            Err(e) => Ok(ToolOutput::error(format!(
                "Failed to send WhatsApp message: {e}"
            ))),
        }
    }
}
