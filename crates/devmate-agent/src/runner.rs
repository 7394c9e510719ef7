// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The supervised agent loop task.
//!
//! One task consumes the gateway's inbound channel and handles requests
//! sequentially; there is no per-request task spawning, so every failure is
//! observed and logged here. Cancellation is the shutdown token.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use devmate_core::InboundRequest;

use crate::agent::FileAgent;

/// Drives the [`FileAgent`] over the inbound request channel.
pub struct AgentLoop {
    agent: Arc<FileAgent>,
}

impl AgentLoop {
    /// Create a loop over the given agent.
    pub fn new(agent: Arc<FileAgent>) -> Self {
        Self { agent }
    }

    /// Consume requests until the channel closes or shutdown is signalled.
    pub async fn run(self, mut rx: mpsc::Receiver<InboundRequest>, shutdown: CancellationToken) {
        info!("agent loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("agent loop shutting down");
                    break;
                }
                maybe = rx.recv() => {
                    match maybe {
                        Some(request) => {
                            debug!(id = %request.id, sender = %request.sender, "handling request");
                            if let Err(e) = self.agent.handle(&request).await {
                                error!(error = %e, id = %request.id, "agent request failed");
                            }
                        }
                        None => {
                            info!("inbound channel closed, stopping agent loop");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use devmate_anthropic::AnthropicClient;
    use devmate_config::DevmateConfig;
    use devmate_hub::{BroadcastHub, FeedWindows};
    use devmate_storage::MemoryEventStore;
    use devmate_whatsapp::WhatsAppClient;

    fn idle_agent() -> Arc<FileAgent> {
        // No request is ever processed in these tests, so the endpoints are
        // never contacted.
        let config = DevmateConfig::default();
        let client =
            AnthropicClient::new("key", "2023-06-01", "claude-sonnet-4-20250514").unwrap();
        let whatsapp = Arc::new(WhatsAppClient::new("token", "555").unwrap());
        let hub = Arc::new(BroadcastHub::new(
            Arc::new(MemoryEventStore::new()),
            FeedWindows::default(),
        ));
        Arc::new(FileAgent::new(&config, client, whatsapp, None, hub))
    }

    #[tokio::test]
    async fn stops_on_shutdown_token() {
        let (_tx, rx) = mpsc::channel(4);
        let token = CancellationToken::new();
        let handle = tokio::spawn(AgentLoop::new(idle_agent()).run(rx, token.clone()));

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<InboundRequest>(4);
        let token = CancellationToken::new();
        let handle = tokio::spawn(AgentLoop::new(idle_agent()).run(rx, token));

        drop(tx);
        handle.await.unwrap();
    }
}
