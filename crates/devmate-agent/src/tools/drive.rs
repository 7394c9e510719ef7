// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Drive upload client.
//!
//! Resumable upload (initiate -> PUT bytes), then an anyone-with-the-link
//! reader permission, returning the `webViewLink`. Credential acquisition
//! is external: the client takes an OAuth bearer token from config.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use devmate_core::DevmateError;

use crate::tools::guess_mime;

/// Base URL for Drive uploads.
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
/// Base URL for Drive metadata/permissions.
const API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// HTTP client for Drive file uploads.
#[derive(Debug, Clone)]
pub struct DriveClient {
    client: reqwest::Client,
    folder_id: Option<String>,
    upload_base: String,
    api_base: String,
}

impl DriveClient {
    /// Creates a new Drive client with the given OAuth bearer token and
    /// optional destination folder.
    pub fn new(access_token: &str, folder_id: Option<String>) -> Result<Self, DevmateError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {access_token}");
        headers.insert(
            "authorization",
            HeaderValue::from_str(&auth).map_err(|e| {
                DevmateError::Config(format!("invalid Drive token header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| DevmateError::Tool {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            folder_id,
            upload_base: UPLOAD_BASE_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URLs (for proxies and wiremock-backed tests).
    pub fn with_base_urls(
        mut self,
        upload_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.upload_base = upload_base.into();
        self.api_base = api_base.into();
        self
    }

    /// Upload a file and return a shareable view link.
    pub async fn upload(&self, path: &Path) -> Result<String, DevmateError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| DevmateError::Tool {
                message: format!("path has no file name: {}", path.display()),
                source: None,
            })?;
        let mime = guess_mime(path);
        let bytes = tokio::fs::read(path).await.map_err(|e| DevmateError::Tool {
            message: format!("failed to read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

        // Initiate the resumable session with the file metadata.
        let mut metadata = serde_json::json!({"name": name});
        if let Some(ref folder) = self.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let initiate_url = format!(
            "{}/files?uploadType=resumable&fields=id,webViewLink",
            self.upload_base
        );
        let response = self
            .client
            .post(&initiate_url)
            .header("x-upload-content-type", mime)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| upload_err("initiate", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Tool {
                message: format!("Drive upload initiation returned {status}: {body}"),
                source: None,
            });
        }
        let session_url = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| DevmateError::Tool {
                message: "Drive upload initiation missing Location header".to_string(),
                source: None,
            })?;

        // Send the bytes to the session URL.
        let size = bytes.len();
        let response = self
            .client
            .put(&session_url)
            .header("content-type", mime)
            .body(bytes)
            .send()
            .await
            .map_err(|e| upload_err("upload", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Tool {
                message: format!("Drive upload returned {status}: {body}"),
                source: None,
            });
        }
        let file: serde_json::Value =
            response.json().await.map_err(|e| DevmateError::Tool {
                message: format!("invalid Drive upload response: {e}"),
                source: Some(Box::new(e)),
            })?;
        let file_id = file
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| DevmateError::Tool {
                message: "Drive upload response missing file id".to_string(),
                source: None,
            })?;

        // Anyone with the link may read.
        let permission_url = format!("{}/files/{}/permissions", self.api_base, file_id);
        let response = self
            .client
            .post(&permission_url)
            .json(&serde_json::json!({"type": "anyone", "role": "reader"}))
            .send()
            .await
            .map_err(|e| upload_err("permission", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevmateError::Tool {
                message: format!("Drive permission returned {status}: {body}"),
                source: None,
            });
        }

        let link = file
            .get("webViewLink")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevmateError::Tool {
                message: "Drive upload response missing webViewLink".to_string(),
                source: None,
            })?;

        debug!(name, size, "file uploaded to Drive");
        Ok(link)
    }
}

fn upload_err(stage: &str, e: reqwest::Error) -> DevmateError {
    DevmateError::Tool {
        message: format!("Drive {stage} request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
