// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the DevMate assistant.
//!
//! Serves three boundaries:
//! - **Ingestion**: `POST /event` feeds producer events into the hub.
//! - **WhatsApp webhook**: verification handshake plus inbound message
//!   delivery to the agent loop.
//! - **Dashboard**: `GET /ws` for live subscribers, `/api/*` as the
//!   equivalent poll fallback.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayServerConfig, GatewayState};
