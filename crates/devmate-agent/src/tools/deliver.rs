// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File delivery tool.
//!
//! Files at or under the direct-size threshold are sent straight over
//! WhatsApp as documents (`file_sent` with `method: "direct"`); larger
//! files are uploaded to Drive and shared as a link (`method: "drive"`).

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use devmate_core::{DevmateError, EventKind};
use devmate_hub::BroadcastHub;
use devmate_whatsapp::WhatsAppClient;

use crate::events::emit;
use crate::tool::{Tool, ToolOutput};
use crate::tools::{guess_mime, DriveClient};

/// Delivers a found file to the requesting user.
pub struct DeliverFileTool {
    whatsapp: Arc<WhatsAppClient>,
    drive: Option<Arc<DriveClient>>,
    hub: Arc<BroadcastHub>,
    /// Reply target for this request.
    recipient: String,
    direct_max_bytes: u64,
}

impl DeliverFileTool {
    /// Create a delivery tool bound to one request's reply target.
    pub fn new(
        whatsapp: Arc<WhatsAppClient>,
        drive: Option<Arc<DriveClient>>,
        hub: Arc<BroadcastHub>,
        recipient: impl Into<String>,
        direct_max_bytes: u64,
    ) -> Self {
        Self {
            whatsapp,
            drive,
            hub,
            recipient: recipient.into(),
            direct_max_bytes,
        }
    }

    async fn deliver_direct(&self, path: &Path, size: u64) -> Result<ToolOutput, DevmateError> {
        let name = file_name(path)?;
        let bytes = tokio::fs::read(path).await.map_err(|e| DevmateError::Tool {
            message: format!("failed to read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let mime = guess_mime(path);

        let media_id = self.whatsapp.upload_media(bytes, mime, &name).await?;
        self.whatsapp
            .send_document(&self.recipient, &media_id, &name)
            .await?;

        emit(
            &self.hub,
            EventKind::FileSent,
            json!({"method": "direct", "name": name, "size": size, "to": self.recipient}),
        )
        .await;

        Ok(ToolOutput::ok(format!(
            "Sent '{name}' directly over WhatsApp."
        )))
    }

    async fn deliver_via_drive(&self, path: &Path, size: u64) -> Result<ToolOutput, DevmateError> {
        let Some(ref drive) = self.drive else {
            return Ok(ToolOutput::error(format!(
                "File is {size} bytes, over the direct-delivery limit, and Drive uploads \
                 are not configured."
            )));
        };
        let name = file_name(path)?;
        let link = drive.upload(path).await?;

        emit(
            &self.hub,
            EventKind::FileSent,
            json!({"method": "drive", "name": name, "size": size, "link": link, "to": self.recipient}),
        )
        .await;

        Ok(ToolOutput::ok(format!(
            "Uploaded '{name}' to Drive. Shareable link: {link}"
        )))
    }
}

fn file_name(path: &Path) -> Result<String, DevmateError> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DevmateError::Tool {
            message: format!("path has no file name: {}", path.display()),
            source: None,
        })
}

#[async_trait]
impl Tool for DeliverFileTool {
    fn name(&self) -> &str {
        "deliver_file"
    }

    fn description(&self) -> &str {
        "Deliver a file to the user: small files are sent directly over WhatsApp, \
         large files are uploaded to Google Drive and shared as a link."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file to deliver"
                }
            },
            "required": ["path"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, DevmateError> {
        let Some(path_str) = input["path"].as_str() else {
            return Ok(ToolOutput::error("missing required 'path' parameter"));
        };
        let path = Path::new(path_str);

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                return Ok(ToolOutput::error(format!("not a regular file: {path_str}")));
            }
            Err(e) => {
                return Ok(ToolOutput::error(format!("file not found: {path_str} ({e})")));
            }
        };

        let size = metadata.len();
        let result = if size <= self.direct_max_bytes {
            self.deliver_direct(path, size).await
        } else {
            self.deliver_via_drive(path, size).await
        };

        // Delivery failures are reported to the model, not raised: the
        // agent can explain and try another route.
        match result {
            Ok(output) => Ok(output),
            Err(e) => Ok(ToolOutput::error(format!("Delivery failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmate_hub::FeedWindows;
    use devmate_storage::MemoryEventStore;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hub() -> Arc<BroadcastHub> {
        Arc::new(BroadcastHub::new(
            Arc::new(MemoryEventStore::new()),
            FeedWindows::default(),
        ))
    }

    async fn whatsapp_mock(server: &MockServer) -> Arc<WhatsAppClient> {
        Mock::given(method("POST"))
            .and(url_path("/555/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "media-7"
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/555/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"id": "wamid.doc"}]
            })))
            .mount(server)
            .await;
        Arc::new(
            WhatsAppClient::new("token", "555")
                .unwrap()
                .with_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn small_file_goes_direct() {
        let server = MockServer::start().await;
        let whatsapp = whatsapp_mock(&server).await;
        let hub = hub();

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("small.txt");
        std::fs::write(&file_path, b"tiny").unwrap();

        let tool = DeliverFileTool::new(whatsapp, None, Arc::clone(&hub), "+1555", 1024);
        let output = tool
            .invoke(serde_json::json!({"path": file_path.to_str().unwrap()}))
            .await
            .unwrap();

        assert!(!output.is_error, "{}", output.content);
        assert!(output.content.contains("directly over WhatsApp"));

        let stats = hub.current_stats().await;
        assert_eq!(stats.direct, 1);
        assert_eq!(stats.drive, 0);

        let files = hub
            .store()
            .recent_of(&[EventKind::FileSent], 10)
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].payload["method"], "direct");
        assert_eq!(files[0].payload["name"], "small.txt");
    }

    #[tokio::test]
    async fn large_file_goes_via_drive() {
        let server = MockServer::start().await;
        let whatsapp = whatsapp_mock(&server).await;
        let hub = hub();

        // Drive mock flow on the same server under distinct paths.
        Mock::given(method("POST"))
            .and(url_path("/upload/files"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("location", format!("{}/session/s1", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(url_path("/session/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "file-1",
                "webViewLink": "https://drive.google.com/file/d/file-1/view"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/files/file-1/permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let drive = Arc::new(
            DriveClient::new("drive-token", None)
                .unwrap()
                .with_base_urls(
                    format!("{}/upload", server.uri()),
                    format!("{}/api", server.uri()),
                ),
        );

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("big.bin");
        std::fs::write(&file_path, vec![0u8; 64]).unwrap();

        // Threshold below the file size forces the Drive route.
        let tool = DeliverFileTool::new(whatsapp, Some(drive), Arc::clone(&hub), "+1555", 16);
        let output = tool
            .invoke(serde_json::json!({"path": file_path.to_str().unwrap()}))
            .await
            .unwrap();

        assert!(!output.is_error, "{}", output.content);
        assert!(output.content.contains("https://drive.google.com/"));

        let stats = hub.current_stats().await;
        assert_eq!(stats.drive, 1);
        assert_eq!(stats.direct, 0);
    }

    #[tokio::test]
    async fn large_file_without_drive_is_tool_error() {
        let server = MockServer::start().await;
        let whatsapp = whatsapp_mock(&server).await;
        let hub = hub();

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("big.bin");
        std::fs::write(&file_path, vec![0u8; 64]).unwrap();

        let tool = DeliverFileTool::new(whatsapp, None, Arc::clone(&hub), "+1555", 16);
        let output = tool
            .invoke(serde_json::json!({"path": file_path.to_str().unwrap()}))
            .await
            .unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("not configured"));
        assert_eq!(hub.current_stats().await.drive, 0);
    }

    #[tokio::test]
    async fn missing_file_is_tool_error() {
        let server = MockServer::start().await;
        let whatsapp = whatsapp_mock(&server).await;
        let tool = DeliverFileTool::new(whatsapp, None, hub(), "+1555", 1024);

        let output = tool
            .invoke(serde_json::json!({"path": "/no/such/file.txt"}))
            .await
            .unwrap();
        assert!(output.is_error);
        assert!(output.content.contains("file not found"));
    }
}
