// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive intervals, a usable base URL, and well-formed channel IDs.

use std::collections::HashSet;

use threadbridge_core::replies::longest_fallback_chars;

use crate::diagnostic::ConfigError;
use crate::model::ThreadbridgeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ThreadbridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bridge.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "bridge.log_level `{}` must be one of {}",
            config.bridge.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let base_url = config.assistant.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::validation("assistant.base_url must not be empty"));
    } else if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        errors.push(ConfigError::validation(format!(
            "assistant.base_url `{base_url}` must start with http:// or https://"
        )));
    }

    if config.assistant.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "assistant.request_timeout_secs must be greater than 0",
        ));
    }

    let dispatch = &config.dispatch;
    for (key, value) in [
        ("dispatch.busy_retry_delay_ms", dispatch.busy_retry_delay_ms),
        ("dispatch.poll_interval_ms", dispatch.poll_interval_ms),
        ("dispatch.run_timeout_secs", dispatch.run_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be greater than 0"
            )));
        }
    }

    if dispatch.max_poll_attempts == 0 {
        errors.push(ConfigError::validation(
            "dispatch.max_poll_attempts must be at least 1",
        ));
    }

    let min_reply = longest_fallback_chars();
    if dispatch.max_reply_chars < min_reply {
        errors.push(ConfigError::validation(format!(
            "dispatch.max_reply_chars must be at least {min_reply} so fallback replies fit, got {}",
            dispatch.max_reply_chars
        )));
    }

    let mut seen = HashSet::new();
    for channel in &config.discord.allowed_channels {
        if channel.is_empty() || !channel.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ConfigError::validation(format!(
                "discord.allowed_channels entry `{channel}` is not a numeric channel ID"
            )));
        }
        if !seen.insert(channel) {
            errors.push(ConfigError::validation(format!(
                "duplicate channel `{channel}` in discord.allowed_channels"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
