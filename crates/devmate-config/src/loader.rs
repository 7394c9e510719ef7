// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./devmate.toml` > `~/.config/devmate/devmate.toml`
//! > `/etc/devmate/devmate.toml` with environment variable overrides via the
//! `DEVMATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DevmateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/devmate/devmate.toml` (system-wide)
/// 3. `~/.config/devmate/devmate.toml` (user XDG config)
/// 4. `./devmate.toml` (local directory)
/// 5. `DEVMATE_*` environment variables
pub fn load_config() -> Result<DevmateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DevmateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DevmateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DevmateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DevmateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DevmateConfig::default()))
        .merge(Toml::file("/etc/devmate/devmate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("devmate/devmate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("devmate.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `DEVMATE_WHATSAPP_API_TOKEN` must map to
/// `whatsapp.api_token`, not `whatsapp.api.token`.
fn env_provider() -> Env {
    Env::prefixed("DEVMATE_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: DEVMATE_WHATSAPP_API_TOKEN -> "whatsapp_api_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("drive_", "drive.", 1)
            .replacen("files_", "files.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("server_", "server.", 1)
            .replacen("dashboard_", "dashboard.", 1);
        mapped.into()
    })
}
