// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud API.
//!
//! Sends text messages via
//! `POST https://graph.facebook.com/v19.0/{phone_number_id}/messages`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;

use devmate_core::DevmateError;

/// Base URL for the Cloud API graph endpoint.
const API_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Outbound text message request body.
#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextPayload<'a>,
}

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    body: &'a str,
}

/// HTTP client for WhatsApp Cloud API communication.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    phone_number_id: String,
    base_url: String,
}

impl WhatsAppClient {
    /// Creates a new Cloud API client.
    ///
    /// # Arguments
    /// * `api_token` - Cloud API bearer token
    /// * `phone_number_id` - phone number id the business account sends from
    pub fn new(api_token: &str, phone_number_id: &str) -> Result<Self, DevmateError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {api_token}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&auth).map_err(|e| {
                DevmateError::Config(format!("invalid WhatsApp token header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DevmateError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            phone_number_id: phone_number_id.to_string(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for proxies and wiremock-backed tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send a text message to the given phone number.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), DevmateError> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let request = SendTextRequest {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextPayload { body },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DevmateError::Channel {
                message: format!("WhatsApp send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Channel {
                message: format!("WhatsApp API returned {status}: {body}"),
                source: None,
            });
        }

        debug!(to, "WhatsApp message sent");
        Ok(())
    }

    /// Upload a media blob, returning the media id Meta assigns.
    pub async fn upload_media(
        &self,
        bytes: Vec<u8>,
        mime: &str,
        filename: &str,
    ) -> Result<String, DevmateError> {
        let url = format!("{}/{}/media", self.base_url, self.phone_number_id);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| DevmateError::Channel {
                message: format!("invalid media mime type `{mime}`: {e}"),
                source: Some(Box::new(e)),
            })?;
        let form = reqwest::multipart::Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", mime.to_string())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DevmateError::Channel {
                message: format!("WhatsApp media upload failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Channel {
                message: format!("WhatsApp media API returned {status}: {body}"),
                source: None,
            });
        }

        let body: serde_json::Value =
            response.json().await.map_err(|e| DevmateError::Channel {
                message: format!("invalid media upload response: {e}"),
                source: Some(Box::new(e)),
            })?;
        body.get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevmateError::Channel {
                message: "media upload response missing id".to_string(),
                source: None,
            })
    }

    /// Send a previously uploaded document to the given phone number.
    pub async fn send_document(
        &self,
        to: &str,
        media_id: &str,
        filename: &str,
    ) -> Result<(), DevmateError> {
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);
        let request = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "document",
            "document": {"id": media_id, "filename": filename}
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DevmateError::Channel {
                message: format!("WhatsApp document send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Channel {
                message: format!("WhatsApp API returned {status}: {body}"),
                source: None,
            });
        }

        debug!(to, media_id, "WhatsApp document sent");
        Ok(())
    }
}
