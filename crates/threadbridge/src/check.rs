// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `threadbridge check-config` command implementation.
//!
//! Prints the effective configuration with secrets reduced to where they
//! come from.

use threadbridge_config::ThreadbridgeConfig;

/// Where a secret value will be taken from at startup.
fn secret_source(configured: &Option<String>, env_var: &str) -> String {
    match configured {
        Some(value) if !value.is_empty() => "set in config (redacted)".to_string(),
        _ if std::env::var(env_var).is_ok_and(|v| !v.is_empty()) => {
            format!("from ${env_var} (redacted)")
        }
        _ => format!("MISSING (set it in config or ${env_var})"),
    }
}

fn plain_source(configured: &Option<String>, env_var: &str) -> String {
    match configured {
        Some(value) if !value.is_empty() => value.clone(),
        _ => match std::env::var(env_var) {
            Ok(value) if !value.is_empty() => format!("{value} (from ${env_var})"),
            _ => format!("MISSING (set it in config or ${env_var})"),
        },
    }
}

/// Renders the configuration summary shown by `check-config`.
pub fn summary(config: &ThreadbridgeConfig) -> String {
    let discord = &config.discord;
    let assistant = &config.assistant;
    let dispatch = &config.dispatch;

    let channels = if discord.allowed_channels.is_empty() {
        "none (serve will refuse to start)".to_string()
    } else {
        discord.allowed_channels.join(", ")
    };

    let lines = [
        "configuration OK".to_string(),
        String::new(),
        "[bridge]".to_string(),
        row("name", &config.bridge.name),
        row("log_level", &config.bridge.log_level),
        "[discord]".to_string(),
        row("bot_token", &secret_source(&discord.bot_token, "DISCORD_TOKEN")),
        row("allowed_channels", &channels),
        "[assistant]".to_string(),
        row("api_key", &secret_source(&assistant.api_key, "OPENAI_API_KEY")),
        row("assistant_id", &plain_source(&assistant.assistant_id, "ASSISTANT_ID")),
        row("base_url", &assistant.base_url),
        row("request_timeout", &format!("{}s", assistant.request_timeout_secs)),
        "[dispatch]".to_string(),
        row("throttle", &format!("{}ms", dispatch.throttle_ms)),
        row("busy_retry_delay", &format!("{}ms", dispatch.busy_retry_delay_ms)),
        row("poll_interval", &format!("{}ms", dispatch.poll_interval_ms)),
        row("run_timeout", &format!("{}s", dispatch.run_timeout_secs)),
        row("max_poll_attempts", &dispatch.max_poll_attempts.to_string()),
        row("max_reply_chars", &dispatch.max_reply_chars.to_string()),
    ];

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn row(key: &str, value: &str) -> String {
    format!("  {key:<20} {value}")
}
