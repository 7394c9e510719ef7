// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers: event ingestion, the read-only poll fallback,
//! and the WhatsApp webhook pair.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use devmate_core::{Event, EventKind, InboundRequest, NewEvent, StatsSnapshot};

use crate::server::GatewayState;

/// Trivial success acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always "ok".
    pub status: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Optional `?limit=` query, capped at the feed window.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Webhook verification handshake query parameters.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

/// POST /event
///
/// Ingestion boundary for external producers: any JSON object with at least
/// a `type` field. The hub assigns id/timestamp, persists, and fans out.
/// A storage failure surfaces as a 500 -- the producer must know the event
/// was not recorded.
pub async fn post_event(State(state): State<GatewayState>, Json(body): Json<Value>) -> Response {
    match state.hub.ingest(NewEvent::from_json(body)).await {
        Ok(_) => (StatusCode::OK, Json(StatusResponse { status: "ok" })).into_response(),
        Err(e) => {
            error!(error = %e, "event ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/stats
///
/// Degrades to the last known counters if the store is unreadable.
pub async fn get_stats(State(state): State<GatewayState>) -> Json<StatsSnapshot> {
    Json(state.hub.current_stats().await)
}

/// GET /api/events
pub async fn get_events(
    State(state): State<GatewayState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let window = state.hub.windows().events;
    let limit = query.limit.unwrap_or(window).min(window);
    feed_response(state.hub.store().recent(limit).await)
}

/// GET /api/conversations
pub async fn get_conversations(
    State(state): State<GatewayState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let window = state.hub.windows().conversations;
    let limit = query.limit.unwrap_or(window).min(window);
    feed_response(
        state
            .hub
            .store()
            .recent_of(&[EventKind::Message, EventKind::Reply], limit)
            .await,
    )
}

/// GET /api/files
pub async fn get_files(
    State(state): State<GatewayState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let window = state.hub.windows().files;
    let limit = query.limit.unwrap_or(window).min(window);
    feed_response(
        state
            .hub
            .store()
            .recent_of(&[EventKind::FileSent], limit)
            .await,
    )
}

fn feed_response(result: Result<Vec<Event>, devmate_core::DevmateError>) -> Response {
    match result {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(e) => {
            error!(error = %e, "event feed read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /webhook/whatsapp
///
/// Meta's verification handshake: echo `hub.challenge` when the mode is
/// `subscribe` and the token matches.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    if query.mode.as_deref() == Some("subscribe")
        && query.verify_token.as_deref() == Some(state.verify_token.as_str())
        && let Some(challenge) = query.challenge
    {
        return (StatusCode::OK, challenge).into_response();
    }
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

/// POST /webhook/whatsapp
///
/// Extracts the user's text message, records a `message` event, and hands
/// the request to the agent loop. Malformed or non-text payloads are
/// acknowledged and ignored -- Meta retries anything else.
pub async fn receive_webhook(
    State(state): State<GatewayState>,
    Json(body): Json<Value>,
) -> Json<StatusResponse> {
    let Some(inbound) = devmate_whatsapp::parse_inbound(&body) else {
        return Json(StatusResponse { status: "ok" });
    };

    let mut payload = serde_json::Map::new();
    payload.insert("from".to_string(), Value::String(inbound.sender.clone()));
    payload.insert("text".to_string(), Value::String(inbound.text.clone()));
    if let Err(e) = state
        .hub
        .ingest(NewEvent::new(EventKind::Message, payload))
        .await
    {
        // The webhook is still acknowledged; Meta must not retry.
        error!(error = %e, "failed to record inbound message event");
    }

    let request = InboundRequest::new(&inbound.sender, &inbound.text);
    if state.inbound_tx.try_send(request).is_err() {
        warn!(sender = %inbound.sender, "agent queue full, dropping request");
    }

    Json(StatusResponse { status: "ok" })
}
