// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard WebSocket handler.
//!
//! Connection lifecycle: send the init snapshot, spawn the forwarder task,
//! register with the hub, then run the keep-alive loop until the peer goes
//! away. The snapshot is sent BEFORE registration, so a subscriber never
//! sees a duplicate event (and may miss at most one ingested in the race
//! window).

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use devmate_hub::{keepalive, SUBSCRIBER_BUFFER};

use crate::server::GatewayState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual dashboard connection.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, ws_receiver) = socket.split();
    let conn_id = uuid::Uuid::new_v4().to_string();

    // Snapshot first, then register.
    let init = state.hub.snapshot().await;
    let Ok(init_text) = init.encode() else {
        return;
    };
    if ws_sender.send(Message::Text(init_text.into())).await.is_err() {
        return;
    }

    // Forwarder task: drains the subscriber channel into the socket.
    let (tx, mut rx) = mpsc::channel::<String>(SUBSCRIBER_BUFFER);
    let forwarder = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    state.hub.registry().add(conn_id.clone(), tx.clone());
    debug!(conn = %conn_id, "dashboard subscriber connected");

    // Inbound traffic is not interpreted; each frame only feeds the idle
    // timer. A close frame or transport error ends the stream.
    let inbound = ws_receiver
        .take_while(|msg| {
            let open = !matches!(msg, Err(_) | Ok(Message::Close(_)));
            futures::future::ready(open)
        })
        .map(|_| ());

    keepalive::run(inbound, tx, state.idle_timeout).await;

    state.hub.registry().remove(&conn_id);
    forwarder.abort();
    debug!(conn = %conn_id, "dashboard subscriber disconnected");
}
