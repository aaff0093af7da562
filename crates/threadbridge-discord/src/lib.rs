// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord channel adapter for the threadbridge relay.
//!
//! Implements [`ChannelAdapter`] over the Discord gateway via serenity.
//! Incoming messages are forwarded to an [`EventSink`]; replies go out as
//! Discord replies to the message that triggered them.

pub mod gateway;
pub mod handler;

pub use gateway::{gateway_channel, GatewayMonitor, GatewaySignal, GatewayState};

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{Client, Http, ShardManager};
use threadbridge_config::model::DiscordConfig;
use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::{ChannelAdapter, EventSink, PluginAdapter};
use threadbridge_core::types::{AdapterType, HealthStatus};
use tracing::{debug, error, info};

use crate::handler::DiscordHandler;

/// Discord channel adapter implementing [`ChannelAdapter`].
pub struct DiscordChannel {
    token: String,
    http: Arc<Http>,
    shard_manager: Option<Arc<ShardManager>>,
    gateway_handle: Option<tokio::task::JoinHandle<()>>,
    signal: GatewaySignal,
    monitor: GatewayMonitor,
}

impl DiscordChannel {
    /// Creates a new Discord channel adapter.
    ///
    /// # Token Resolution
    /// 1. `discord.bot_token` if set
    /// 2. `DISCORD_TOKEN` environment variable
    /// 3. Returns error if neither is available
    pub fn new(config: &DiscordConfig) -> Result<Self, BridgeError> {
        let token = resolve_token(&config.bot_token)?;
        Self::from_token(token)
    }

    /// Creates an adapter from an explicit bot token.
    pub fn from_token(token: String) -> Result<Self, BridgeError> {
        if token.trim().is_empty() {
            return Err(BridgeError::Config("discord bot token cannot be empty".into()));
        }

        let http = Arc::new(Http::new(&token));
        let (signal, monitor) = gateway_channel();
        Ok(Self {
            token,
            http,
            shard_manager: None,
            gateway_handle: None,
            signal,
            monitor,
        })
    }

    /// Follows the gateway started by [`connect`](ChannelAdapter::connect).
    pub fn gateway(&self) -> GatewayMonitor {
        self.monitor.clone()
    }

    /// True while the gateway task is alive and Discord has sent `ready`.
    pub fn is_connected(&self) -> bool {
        self.gateway_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
            && self.monitor.is_ready()
    }
}

#[async_trait]
impl PluginAdapter for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Discord API unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        debug!("Discord channel shutting down");
        if let Some(shard_manager) = &self.shard_manager {
            shard_manager.shutdown_all().await;
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for DiscordChannel {
    async fn connect(&mut self, sink: Arc<dyn EventSink>) -> Result<(), BridgeError> {
        if self.gateway_handle.is_some() {
            return Ok(()); // Already connected
        }

        let mut client = Client::builder(&self.token, DiscordHandler::intents())
            .event_handler(DiscordHandler::new(sink, self.signal.clone()))
            .await
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to build Discord client: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.shard_manager = Some(client.shard_manager.clone());

        info!("connecting to Discord gateway");
        let signal = self.signal.clone();
        self.gateway_handle = Some(tokio::spawn(async move {
            match client.start().await {
                Ok(()) => {
                    info!("Discord gateway stopped");
                    signal.finished(Ok(()));
                }
                Err(e) => {
                    error!(error = %e, "Discord gateway stopped with error");
                    signal.finished(Err(e.to_string()));
                }
            }
        }));

        Ok(())
    }
}

/// Resolves the bot token: config -> `DISCORD_TOKEN` env var -> error.
fn resolve_token(config_token: &Option<String>) -> Result<String, BridgeError> {
    if let Some(token) = config_token
        && !token.is_empty()
    {
        return Ok(token.clone());
    }

    std::env::var("DISCORD_TOKEN").map_err(|_| {
        BridgeError::Config(
            "Discord bot token not found. Set discord.bot_token in config or DISCORD_TOKEN environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayState;

    #[test]
    fn empty_token_is_rejected() {
        let result = DiscordChannel::from_token("   ".into());
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn adapter_identity() {
        let channel = DiscordChannel::from_token("test-token".into()).unwrap();
        assert_eq!(channel.name(), "discord");
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
        assert!(!channel.is_connected());
    }

    #[test]
    fn resolve_token_prefers_config() {
        let token = resolve_token(&Some("from-config".into())).unwrap();
        assert_eq!(token, "from-config");
    }

    #[test]
    fn resolve_token_none_falls_back_to_env() {
        // Succeeds only if DISCORD_TOKEN happens to be set.
        if let Err(e) = resolve_token(&None) {
            assert!(e.to_string().contains("token not found"), "got: {e}");
        }
    }

    #[test]
    fn gateway_starts_connecting() {
        let channel = DiscordChannel::from_token("test-token".into()).unwrap();
        assert_eq!(channel.gateway().state(), GatewayState::Connecting);
    }

    #[tokio::test]
    async fn failed_gateway_is_not_connected() {
        let mut channel = DiscordChannel::from_token("test-token".into()).unwrap();
        channel.gateway_handle = Some(tokio::spawn(async {}));
        channel.signal.ready();
        channel.signal.finished(Err("Authentication failed".into()));

        assert!(!channel.is_connected());
        let err = channel.gateway().closed().await;
        assert!(err.to_string().contains("Authentication failed"), "got: {err}");
    }

    #[tokio::test]
    async fn live_ready_gateway_is_connected() {
        let mut channel = DiscordChannel::from_token("test-token".into()).unwrap();
        let (_hold, wait) = tokio::sync::oneshot::channel::<()>();
        channel.gateway_handle = Some(tokio::spawn(async move {
            let _ = wait.await;
        }));
        assert!(!channel.is_connected());

        channel.signal.ready();
        assert!(channel.is_connected());
    }

    #[tokio::test]
    async fn shutdown_before_connect_is_a_no_op() {
        let channel = DiscordChannel::from_token("test-token".into()).unwrap();
        channel.shutdown().await.unwrap();
    }
}
