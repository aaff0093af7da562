// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./threadbridge.toml` > `~/.config/threadbridge/threadbridge.toml`
//! > `/etc/threadbridge/threadbridge.toml` with environment variable overrides via the
//! `THREADBRIDGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ThreadbridgeConfig;

/// File name searched for in every config directory.
pub const CONFIG_FILE_NAME: &str = "threadbridge.toml";

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/threadbridge/threadbridge.toml";

/// Returns the per-user config file path, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("threadbridge").join(CONFIG_FILE_NAME))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/threadbridge/threadbridge.toml` (system-wide)
/// 3. `~/.config/threadbridge/threadbridge.toml` (user XDG config)
/// 4. `./threadbridge.toml` (local directory)
/// 5. `THREADBRIDGE_*` environment variables
pub fn load_config() -> Result<ThreadbridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ThreadbridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThreadbridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// Unlike the standard locations, an explicitly named file must exist.
pub fn load_config_from_path(path: &Path) -> Result<ThreadbridgeConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    tracing::debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(ThreadbridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ThreadbridgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `THREADBRIDGE_DISCORD_BOT_TOKEN` must map to `discord.bot_token`,
/// not `discord.bot.token`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("THREADBRIDGE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

/// Maps a prefix-stripped, lowercased env var name to a dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ["bridge", "discord", "assistant", "dispatch"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
