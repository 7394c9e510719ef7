// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use devmate_core::{DevmateError, InboundRequest};
use devmate_hub::BroadcastHub;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The broadcast hub (store + subscriber registry).
    pub hub: Arc<BroadcastHub>,
    /// Channel for forwarding user messages to the agent loop.
    pub inbound_tx: mpsc::Sender<InboundRequest>,
    /// Ingestion authentication configuration.
    pub auth: AuthConfig,
    /// Token Meta echoes during webhook verification.
    pub verify_token: String,
    /// Idle window before a subscriber keep-alive ping.
    pub idle_timeout: Duration,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors `ServerConfig`/`DashboardConfig`
/// from devmate-config to avoid a dependency on the config crate).
#[derive(Debug, Clone)]
pub struct GatewayServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router:
/// - POST /event (optional bearer auth)
/// - GET /health, /api/stats, /api/events, /api/conversations, /api/files
/// - GET+POST /webhook/whatsapp
/// - GET /ws (dashboard subscribers)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let ingest_routes = Router::new()
        .route("/event", post(handlers::post_event))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/events", get(handlers::get_events))
        .route("/api/conversations", get(handlers::get_conversations))
        .route("/api/files", get(handlers::get_files))
        .route(
            "/webhook/whatsapp",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(ingest_routes)
        .merge(public_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server and serve until the task is
/// aborted.
pub async fn start_server(
    config: &GatewayServerConfig,
    state: GatewayState,
) -> Result<(), DevmateError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DevmateError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| DevmateError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
