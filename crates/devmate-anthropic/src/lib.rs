// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API integration for the DevMate agent.

pub mod client;
pub mod types;

pub use client::AnthropicClient;
pub use types::{
    ApiContent, ApiContentBlock, ApiMessage, MessageRequest, MessageResponse,
    ResponseContentBlock, ToolDefinition,
};
