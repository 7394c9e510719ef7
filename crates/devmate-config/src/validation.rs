// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, non-empty paths, and non-zero
//! window sizes.

use crate::diagnostic::ConfigError;
use crate::model::DevmateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DevmateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // server.host must be a valid IP or hostname.
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    // database_path is required unless the in-memory store is selected.
    if !config.storage.in_memory && config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Dashboard windows and timers must be non-zero.
    for (key, value) in [
        ("dashboard.recent_events", config.dashboard.recent_events),
        (
            "dashboard.recent_conversations",
            config.dashboard.recent_conversations,
        ),
        ("dashboard.recent_files", config.dashboard.recent_files),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1, got 0"),
            });
        }
    }

    if config.dashboard.idle_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dashboard.idle_timeout_secs must be at least 1, got 0".to_string(),
        });
    }

    if config.agent.max_tool_iterations == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_tool_iterations must be at least 1, got 0".to_string(),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.max_tokens must be at least 1, got 0".to_string(),
        });
    }

    if config.drive.direct_max_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "drive.direct_max_bytes must be at least 1, got 0".to_string(),
        });
    }

    // WhatsApp delivery needs both halves of the credential pair.
    if config.whatsapp.api_token.is_some() != config.whatsapp.phone_number_id.is_some() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.api_token and whatsapp.phone_number_id must be set together"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
