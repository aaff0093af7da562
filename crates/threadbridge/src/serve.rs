// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `threadbridge serve` command implementation.
//!
//! Wires the Discord adapter, inbound filter, message queue, dispatch loop and
//! OpenAI backend together. Messages are consumed once Discord reports ready,
//! and relaying continues until SIGINT, SIGTERM, or the gateway ending.

use std::sync::Arc;

use threadbridge_agent::{
    message_queue, shutdown, AllowList, DispatchLoop, DispatchReport, HandlerSettings,
    InboundFilter, MessageHandler,
};
use threadbridge_config::ThreadbridgeConfig;
use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::{ChannelAdapter, PluginAdapter};
use threadbridge_core::types::HealthStatus;
use threadbridge_discord::{DiscordChannel, GatewayMonitor};
use threadbridge_openai::OpenAiAssistant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs the `threadbridge serve` command.
pub async fn run_serve(config: ThreadbridgeConfig) -> Result<(), BridgeError> {
    init_tracing(&config.bridge.log_level);

    info!(name = config.bridge.name.as_str(), "starting threadbridge serve");

    let allow_list = allow_list(&config)?;

    let backend = Arc::new(OpenAiAssistant::new(&config.assistant)?);
    match backend.health_check().await? {
        HealthStatus::Healthy => info!("assistant backend reachable"),
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = reason.as_str(), "assistant backend check failed, continuing");
        }
    }

    let (queue_tx, queue_rx) = message_queue();
    let filter = Arc::new(InboundFilter::new(allow_list.clone(), queue_tx));

    let settings = HandlerSettings::from_config(backend.assistant_id(), &config.dispatch);
    let handler = MessageHandler::new(backend.clone(), allow_list.clone(), settings);
    let dispatch = DispatchLoop::new(queue_rx, handler, config.dispatch.throttle());

    let mut discord = DiscordChannel::new(&config.discord)?;
    let mut gateway = discord.gateway();
    let cancel = shutdown::install_signal_handler();
    discord.connect(filter).await?;

    let outcome = match wait_for_ready(&mut gateway, &cancel).await {
        Ok(true) => {
            info!(channels = allow_list.len(), "threadbridge relaying");
            relay(dispatch.run(cancel.clone()), &mut gateway, &cancel)
                .await
                .map(Some)
        }
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    };

    let adapters: [&dyn PluginAdapter; 2] = [&discord, backend.as_ref()];
    shutdown::shutdown_adapters(&adapters).await;

    if let Some(report) = outcome? {
        info!(
            processed = report.processed,
            failed = report.failed,
            dropped = report.dropped,
            "dispatch summary"
        );
    }
    info!("threadbridge serve shutdown complete");
    Ok(())
}

/// Waits for the gateway's `ready`. Returns `Ok(false)` if shutdown came first.
async fn wait_for_ready(
    gateway: &mut GatewayMonitor,
    cancel: &CancellationToken,
) -> Result<bool, BridgeError> {
    tokio::select! {
        ready = gateway.ready() => ready.map(|()| true),
        () = cancel.cancelled() => {
            info!("shutdown requested before Discord was ready");
            Ok(false)
        }
    }
}

/// Drives the dispatch loop until it stops or the gateway ends.
///
/// When the gateway ends first the loop is cancelled, its in-flight message
/// completes, and the gateway error is returned.
async fn relay<F>(
    dispatch: F,
    gateway: &mut GatewayMonitor,
    cancel: &CancellationToken,
) -> Result<DispatchReport, BridgeError>
where
    F: Future<Output = DispatchReport>,
{
    tokio::pin!(dispatch);
    tokio::select! {
        report = &mut dispatch => Ok(report),
        err = gateway.closed() => {
            error!(error = %err, "Discord gateway lost, stopping relay");
            cancel.cancel();
            let report = dispatch.await;
            warn!(
                processed = report.processed,
                dropped = report.dropped,
                "relay stopped after gateway loss"
            );
            Err(err)
        }
    }
}

/// Builds the allow-list, refusing to run with none.
fn allow_list(config: &ThreadbridgeConfig) -> Result<AllowList, BridgeError> {
    if config.discord.allowed_channels.is_empty() {
        return Err(BridgeError::Config(
            "discord.allowed_channels is empty, so no message would ever be relayed".into(),
        ));
    }
    Ok(AllowList::from_config(&config.discord.allowed_channels))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("threadbridge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
