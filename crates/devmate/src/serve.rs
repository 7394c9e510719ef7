// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `devmate serve` command implementation.
//!
//! Wires the event store, broadcast hub, agent loop, and gateway together,
//! then blocks until a shutdown signal arrives. The hub is an explicitly
//! constructed owned object passed by handle to every component -- there is
//! no process-wide singleton.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use devmate_agent::shutdown;
use devmate_agent::{AgentLoop, DriveClient, FileAgent};
use devmate_anthropic::AnthropicClient;
use devmate_config::DevmateConfig;
use devmate_core::{DevmateError, EventStore};
use devmate_gateway::{start_server, AuthConfig, GatewayServerConfig, GatewayState};
use devmate_hub::{BroadcastHub, FeedWindows};
use devmate_storage::{MemoryEventStore, SqliteEventStore};
use devmate_whatsapp::WhatsAppClient;

/// Inbound request queue depth between the webhook and the agent loop.
const INBOUND_QUEUE: usize = 256;

/// Runs the `devmate serve` command.
pub async fn run_serve(config: DevmateConfig) -> Result<(), DevmateError> {
    init_tracing(&config.agent.log_level);

    info!("starting devmate serve");

    // Event store: SQLite by default, in-memory when configured.
    let (store, sqlite): (Arc<dyn EventStore>, Option<Arc<SqliteEventStore>>) =
        if config.storage.in_memory {
            info!("using in-memory event store (history will not survive restarts)");
            (Arc::new(MemoryEventStore::new()), None)
        } else {
            let sqlite = Arc::new(SqliteEventStore::open(&config.storage).await?);
            info!(path = %config.storage.database_path, "event store opened");
            (
                Arc::clone(&sqlite) as Arc<dyn EventStore>,
                Some(sqlite),
            )
        };

    let windows = FeedWindows {
        events: config.dashboard.recent_events,
        conversations: config.dashboard.recent_conversations,
        files: config.dashboard.recent_files,
    };
    let hub = Arc::new(BroadcastHub::new(store, windows));

    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
    let shutdown_token = shutdown::install_signal_handler();

    // Agent loop (requires WhatsApp + Anthropic credentials).
    let mut agent_task = None;
    match (&config.whatsapp.api_token, &config.whatsapp.phone_number_id) {
        (Some(api_token), Some(phone_number_id)) => {
            let api_key = config
                .anthropic
                .api_key
                .clone()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .ok_or_else(|| {
                    DevmateError::Config(
                        "Anthropic API key required: set anthropic.api_key or ANTHROPIC_API_KEY"
                            .to_string(),
                    )
                })?;
            let client = AnthropicClient::new(
                &api_key,
                &config.anthropic.api_version,
                &config.anthropic.default_model,
            )?;
            let whatsapp = Arc::new(WhatsAppClient::new(api_token, phone_number_id)?);
            let drive = match &config.drive.access_token {
                Some(token) => Some(Arc::new(DriveClient::new(
                    token,
                    config.drive.folder_id.clone(),
                )?)),
                None => {
                    info!("drive uploads disabled (no drive.access_token)");
                    None
                }
            };

            let agent = Arc::new(FileAgent::new(
                &config,
                client,
                whatsapp,
                drive,
                Arc::clone(&hub),
            ));
            agent_task = Some(tokio::spawn(
                AgentLoop::new(agent).run(inbound_rx, shutdown_token.clone()),
            ));
        }
        _ => {
            // Without WhatsApp there is nothing to reply to; the hub,
            // ingestion API, and dashboard still run.
            warn!("whatsapp not configured -- running as event hub only");
            drop(inbound_rx);
        }
    }

    // Gateway server.
    let state = GatewayState {
        hub: Arc::clone(&hub),
        inbound_tx,
        auth: AuthConfig {
            bearer_token: config.server.bearer_token.clone(),
        },
        verify_token: config.whatsapp.verify_token.clone(),
        idle_timeout: Duration::from_secs(config.dashboard.idle_timeout_secs),
        start_time: std::time::Instant::now(),
    };
    let server_config = GatewayServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server_task = tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, state).await {
            error!(error = %e, "gateway server error");
        }
    });

    // Block until SIGINT/SIGTERM.
    shutdown_token.cancelled().await;
    info!("shutting down");

    server_task.abort();
    if let Some(task) = agent_task {
        // The agent loop observes the token and drains on its own.
        let _ = task.await;
    }
    if let Some(sqlite) = sqlite {
        sqlite.close().await?;
    }

    info!("devmate stopped");
    Ok(())
}

/// Initialize the tracing subscriber from the configured log level,
/// overridable via `RUST_LOG`.
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
