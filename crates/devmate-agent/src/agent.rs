// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The file-assistant agent: an Anthropic tool-calling loop over the three
//! delivery tools.
//!
//! Each request runs search -> deliver -> reply under the model's control,
//! bounded by `agent.max_tool_iterations`. Every step is reported to the
//! broadcast hub: `agent_thinking`, `tool_call`/`tool_result` pairs, and
//! `agent_complete` on success or an `error` event on failure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use devmate_anthropic::{
    AnthropicClient, ApiContent, ApiContentBlock, ApiMessage, MessageRequest,
    ResponseContentBlock,
};
use devmate_config::DevmateConfig;
use devmate_core::{DevmateError, EventKind, InboundRequest};
use devmate_hub::BroadcastHub;
use devmate_whatsapp::WhatsAppClient;

use crate::events::{emit, emit_tag};
use crate::history::ConversationHistory;
use crate::prompts::SYSTEM_PROMPT;
use crate::tool::{ToolOutput, ToolRegistry};
use crate::tools::{DeliverFileTool, DriveClient, SearchFileTool, SendWhatsAppTool};

/// The WhatsApp file assistant.
pub struct FileAgent {
    client: AnthropicClient,
    hub: Arc<BroadcastHub>,
    whatsapp: Arc<WhatsAppClient>,
    drive: Option<Arc<DriveClient>>,
    files_root: PathBuf,
    search_timeout: Duration,
    direct_max_bytes: u64,
    max_iterations: usize,
    max_tokens: u32,
    system_prompt: String,
    history: ConversationHistory,
}

impl FileAgent {
    /// Assemble the agent from configuration and its collaborators.
    pub fn new(
        config: &DevmateConfig,
        client: AnthropicClient,
        whatsapp: Arc<WhatsAppClient>,
        drive: Option<Arc<DriveClient>>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        let system_prompt = config
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string());
        Self {
            client,
            hub,
            whatsapp,
            drive,
            files_root: PathBuf::from(&config.files.root),
            search_timeout: Duration::from_secs(config.files.search_timeout_secs),
            direct_max_bytes: config.drive.direct_max_bytes,
            max_iterations: config.agent.max_tool_iterations,
            max_tokens: config.anthropic.max_tokens,
            system_prompt,
            history: ConversationHistory::new(config.agent.max_history_turns),
        }
    }

    /// Tools bound to this request's reply target.
    fn build_registry(&self, recipient: &str) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SearchFileTool::new(
            self.files_root.clone(),
            self.search_timeout,
        )));
        registry.register(Arc::new(DeliverFileTool::new(
            Arc::clone(&self.whatsapp),
            self.drive.clone(),
            Arc::clone(&self.hub),
            recipient,
            self.direct_max_bytes,
        )));
        registry.register(Arc::new(SendWhatsAppTool::new(
            Arc::clone(&self.whatsapp),
            Arc::clone(&self.hub),
            recipient,
        )));
        registry
    }

    /// Run the tool-calling loop for one user request.
    ///
    /// Returns the agent's final text. Tool failures are absorbed into the
    /// conversation; only provider failures abort the request (after
    /// recording an `error` event).
    pub async fn handle(&self, request: &InboundRequest) -> Result<String, DevmateError> {
        emit_tag(
            &self.hub,
            "agent_thinking",
            json!({
                "message": format!("Processing: {}", request.text),
                "sender": request.sender,
            }),
        )
        .await;

        let registry = self.build_registry(&request.sender);
        let tools = registry.definitions();

        let mut messages = Vec::new();
        for turn in self.history.get(&request.sender) {
            messages.push(ApiMessage::user(turn.human));
            messages.push(ApiMessage::assistant(turn.ai));
        }
        messages.push(ApiMessage::user(request.text.clone()));

        let mut final_text = String::new();
        for iteration in 0..self.max_iterations {
            let api_request = MessageRequest {
                model: self.client.default_model().to_string(),
                messages: messages.clone(),
                system: Some(self.system_prompt.clone()),
                max_tokens: self.max_tokens,
                tools: Some(tools.clone()),
            };

            let response = match self.client.complete_message(&api_request).await {
                Ok(response) => response,
                Err(e) => {
                    emit(
                        &self.hub,
                        EventKind::Error,
                        json!({
                            "stage": "agent",
                            "error": e.to_string(),
                            "sender": request.sender,
                        }),
                    )
                    .await;
                    return Err(e);
                }
            };
            debug!(
                iteration,
                stop_reason = response.stop_reason.as_deref().unwrap_or(""),
                "model turn complete"
            );

            let tool_uses: Vec<(String, String, serde_json::Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            // Echo the assistant turn back into the conversation.
            let assistant_blocks: Vec<ApiContentBlock> = response
                .content
                .iter()
                .map(|block| match block {
                    ResponseContentBlock::Text { text } => {
                        ApiContentBlock::Text { text: text.clone() }
                    }
                    ResponseContentBlock::ToolUse { id, name, input } => {
                        ApiContentBlock::ToolUse {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        }
                    }
                })
                .collect();
            messages.push(ApiMessage {
                role: "assistant".to_string(),
                content: ApiContent::Blocks(assistant_blocks),
            });

            if tool_uses.is_empty() {
                final_text = response.text();
                break;
            }

            let mut result_blocks = Vec::new();
            for (id, name, input) in tool_uses {
                emit_tag(
                    &self.hub,
                    "tool_call",
                    json!({"tool": name, "input": input, "sender": request.sender}),
                )
                .await;

                let output = match registry.get(&name) {
                    Some(tool) => tool
                        .invoke(input)
                        .await
                        .unwrap_or_else(|e| ToolOutput::error(format!("tool failed: {e}"))),
                    None => ToolOutput::error(format!("unknown tool '{name}'")),
                };

                if output.is_error {
                    warn!(tool = %name, result = %output.content, "tool reported an error");
                }
                emit_tag(
                    &self.hub,
                    "tool_result",
                    json!({
                        "tool": name,
                        "result": output.content,
                        "is_error": output.is_error,
                    }),
                )
                .await;

                result_blocks.push(ApiContentBlock::ToolResult {
                    tool_use_id: id,
                    content: output.content,
                    is_error: output.is_error.then_some(true),
                });
            }
            messages.push(ApiMessage {
                role: "user".to_string(),
                content: ApiContent::Blocks(result_blocks),
            });
        }

        if final_text.is_empty() {
            final_text = "Done.".to_string();
        }

        self.history
            .record(&request.sender, &request.text, &final_text);
        emit_tag(
            &self.hub,
            "agent_complete",
            json!({"output": final_text, "sender": request.sender}),
        )
        .await;

        Ok(final_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmate_hub::FeedWindows;
    use devmate_storage::MemoryEventStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hub() -> Arc<BroadcastHub> {
        Arc::new(BroadcastHub::new(
            Arc::new(MemoryEventStore::new()),
            FeedWindows::default(),
        ))
    }

    async fn test_agent(
        anthropic: &MockServer,
        whatsapp: &MockServer,
        files_root: &std::path::Path,
        hub: Arc<BroadcastHub>,
    ) -> FileAgent {
        let mut config = DevmateConfig::default();
        config.files.root = files_root.display().to_string();
        config.agent.max_tool_iterations = 4;

        let client = AnthropicClient::new("key", "2023-06-01", "claude-sonnet-4-20250514")
            .unwrap()
            .with_base_url(anthropic.uri());
        let whatsapp = Arc::new(
            WhatsAppClient::new("token", "555")
                .unwrap()
                .with_base_url(whatsapp.uri()),
        );
        FileAgent::new(&config, client, whatsapp, None, hub)
    }

    fn tool_use_response(tool: &str, input: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_tool",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Working on it."},
                {"type": "tool_use", "id": "toolu_1", "name": tool, "input": input}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 10}
        })
    }

    fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_final",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn runs_tool_loop_and_reports_lifecycle() {
        let anthropic = MockServer::start().await;
        let whatsapp = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        // First turn requests a search, second turn finishes.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_use_response(
                "search_file",
                serde_json::json!({"filename": "notes"}),
            )))
            .up_to_n_times(1)
            .mount(&anthropic)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("Found and sent.")),
            )
            .mount(&anthropic)
            .await;

        let hub = hub();
        let agent = test_agent(&anthropic, &whatsapp, dir.path(), Arc::clone(&hub)).await;

        let request = InboundRequest::new("+1555", "find my notes");
        let answer = agent.handle(&request).await.unwrap();
        assert_eq!(answer, "Found and sent.");

        // Lifecycle events landed in order.
        let events = hub.store().recent(50).await.unwrap();
        let kinds: Vec<String> = events.iter().map(|e| e.kind.as_str().to_string()).collect();
        assert_eq!(
            kinds,
            vec!["agent_thinking", "tool_call", "tool_result", "agent_complete"]
        );

        // The search tool really ran against the temp root.
        let tool_result = &events[2];
        assert!(tool_result
            .payload
            .get("result")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("notes.txt"));

        // History recorded the turn.
        let turns = agent.history.get("+1555");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].ai, "Found and sent.");
    }

    #[tokio::test]
    async fn provider_failure_records_error_event() {
        let anthropic = MockServer::start().await;
        let whatsapp = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "bad"}
            })))
            .mount(&anthropic)
            .await;

        let hub = hub();
        let agent = test_agent(&anthropic, &whatsapp, dir.path(), Arc::clone(&hub)).await;

        let request = InboundRequest::new("+1555", "find something");
        let result = agent.handle(&request).await;
        assert!(result.is_err());

        let stats = hub.current_stats().await;
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_absorbed_into_conversation() {
        let anthropic = MockServer::start().await;
        let whatsapp = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_use_response(
                "not_a_tool",
                serde_json::json!({}),
            )))
            .up_to_n_times(1)
            .mount(&anthropic)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Sorry.")))
            .mount(&anthropic)
            .await;

        let hub = hub();
        let agent = test_agent(&anthropic, &whatsapp, dir.path(), Arc::clone(&hub)).await;

        let answer = agent
            .handle(&InboundRequest::new("+1555", "do something odd"))
            .await
            .unwrap();
        assert_eq!(answer, "Sorry.");
    }

    #[tokio::test]
    async fn iteration_limit_ends_with_default_answer() {
        let anthropic = MockServer::start().await;
        let whatsapp = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        // The model keeps asking for searches forever.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tool_use_response(
                "search_file",
                serde_json::json!({"filename": "zzz"}),
            )))
            .mount(&anthropic)
            .await;

        let hub = hub();
        let agent = test_agent(&anthropic, &whatsapp, dir.path(), Arc::clone(&hub)).await;

        let answer = agent
            .handle(&InboundRequest::new("+1555", "loop forever"))
            .await
            .unwrap();
        assert_eq!(answer, "Done.");
    }
}
