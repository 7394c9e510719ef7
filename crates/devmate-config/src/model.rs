// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the DevMate assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level DevMate configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DevmateConfig {
    /// Agent identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Google Drive upload settings.
    #[serde(default)]
    pub drive: DriveConfig,

    /// File search settings.
    #[serde(default)]
    pub files: FilesConfig,

    /// Event store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dashboard feed and keep-alive settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum tool-calling iterations per request.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Conversation turns kept per sender.
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Inline system prompt override. The built-in prompt is used when unset.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            max_tool_iterations: default_max_tool_iterations(),
            max_history_turns: default_max_history_turns(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "devmate".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_tool_iterations() -> usize {
    6
}

fn default_max_history_turns() -> usize {
    10
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model to use for LLM requests.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// WhatsApp Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Cloud API bearer token. `None` disables outbound WhatsApp delivery.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Phone number id the business account sends from.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Token Meta echoes during the webhook verification handshake.
    #[serde(default = "default_verify_token")]
    pub verify_token: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            phone_number_id: None,
            verify_token: default_verify_token(),
        }
    }
}

fn default_verify_token() -> String {
    "devmate_token".to_string()
}

/// Google Drive upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    /// OAuth bearer token for the Drive API. `None` disables Drive uploads.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Destination folder id. Uploads land in the Drive root when unset.
    #[serde(default)]
    pub folder_id: Option<String>,

    /// Files at or under this size are delivered directly; larger files go
    /// to Drive.
    #[serde(default = "default_direct_max_bytes")]
    pub direct_max_bytes: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            folder_id: None,
            direct_max_bytes: default_direct_max_bytes(),
        }
    }
}

fn default_direct_max_bytes() -> u64 {
    10 * 1024 * 1024
}

/// File search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// Root directory the file search walks.
    #[serde(default = "default_files_root")]
    pub root: String,

    /// Seconds before a search is abandoned.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: default_files_root(),
            search_timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_files_root() -> String {
    dirs::home_dir()
        .map(|p| p.join("Documents"))
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .display()
        .to_string()
}

fn default_search_timeout_secs() -> u64 {
    15
}

/// Event store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Keep the event history in memory instead of SQLite.
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            in_memory: false,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("devmate").join("devmate.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("devmate.db"))
        .display()
        .to_string()
}

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token guarding `POST /event`. Ingestion is open when unset.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Dashboard feed windows and keep-alive timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Events kept in the generic feed snapshot.
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,

    /// Events kept in the conversation sub-feed snapshot.
    #[serde(default = "default_recent_conversations")]
    pub recent_conversations: usize,

    /// Events kept in the file sub-feed snapshot.
    #[serde(default = "default_recent_files")]
    pub recent_files: usize,

    /// Idle seconds before a keep-alive ping is sent to a subscriber.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_events: default_recent_events(),
            recent_conversations: default_recent_conversations(),
            recent_files: default_recent_files(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_recent_events() -> usize {
    200
}

fn default_recent_conversations() -> usize {
    100
}

fn default_recent_files() -> usize {
    100
}

fn default_idle_timeout_secs() -> u64 {
    25
}
