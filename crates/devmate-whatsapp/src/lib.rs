// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API integration for DevMate.
//!
//! Outbound: [`WhatsAppClient`] sends text replies. Inbound: webhook payload
//! types and [`parse_inbound`] extract the user's text message from Meta's
//! delivery envelope; the gateway owns the webhook routes themselves.

pub mod client;
pub mod types;

pub use client::WhatsAppClient;
pub use types::{parse_inbound, InboundText, WebhookPayload};
