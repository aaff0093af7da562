// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the threadbridge relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use threadbridge_core::replies::DISCORD_MESSAGE_LIMIT;

/// Top-level threadbridge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadbridgeConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Discord connection and channel allow-list.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Assistant backend settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Queue throttling, retry and run polling settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Display name used in logs.
    #[serde(default = "default_bridge_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            name: default_bridge_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bridge_name() -> String {
    "threadbridge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Discord bot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Discord bot token. `None` falls back to the `DISCORD_TOKEN` environment variable.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Channel IDs the bridge listens in. Messages elsewhere are ignored.
    #[serde(default)]
    pub allowed_channels: Vec<String>,
}

/// Assistant backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Assistant every run is bound to. `None` falls back to `ASSISTANT_ID`.
    #[serde(default)]
    pub assistant_id: Option<String>,

    /// Base URL of the assistants API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Dispatch loop and message handler timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Pause after each processed message, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Delay before the single retry of a busy-thread append, in milliseconds.
    #[serde(default = "default_busy_retry_delay_ms")]
    pub busy_retry_delay_ms: u64,

    /// Interval between run status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Longest time to wait for a run to finish, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Maximum number of status polls per run.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Longest reply, in characters, that is sent verbatim.
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            busy_retry_delay_ms: default_busy_retry_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

impl DispatchConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn busy_retry_delay(&self) -> Duration {
        Duration::from_millis(self.busy_retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_busy_retry_delay_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_max_poll_attempts() -> u32 {
    600
}

fn default_max_reply_chars() -> usize {
    DISCORD_MESSAGE_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_relay_timings() {
        let dispatch = DispatchConfig::default();
        assert_eq!(dispatch.throttle(), Duration::from_secs(1));
        assert_eq!(dispatch.busy_retry_delay(), Duration::from_secs(2));
        assert_eq!(dispatch.poll_interval(), Duration::from_secs(1));
        assert_eq!(dispatch.run_timeout(), Duration::from_secs(300));
        assert_eq!(dispatch.max_poll_attempts, 600);
        assert_eq!(dispatch.max_reply_chars, 2000);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ThreadbridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.bridge.name, "threadbridge");
        assert_eq!(config.assistant.base_url, "https://api.openai.com/v1");
        assert!(config.discord.allowed_channels.is_empty());
        assert!(config.discord.bot_token.is_none());
    }

    #[test]
    fn dispatch_deny_unknown_fields() {
        let toml_str = r#"
[dispatch]
throttle_ms = 500
retry_forever = true
"#;
        assert!(toml::from_str::<ThreadbridgeConfig>(toml_str).is_err());
    }
}
