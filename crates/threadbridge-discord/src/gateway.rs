// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway lifecycle tracking.
//!
//! The gateway runs in a background task. Its state is published on a watch
//! channel so the process can wait for `ready` and notice when the task ends.

use std::sync::Arc;

use threadbridge_core::error::BridgeError;
use tokio::sync::watch;

/// Lifecycle of the Discord gateway connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayState {
    /// The client has been started but no `ready` event has arrived.
    Connecting,
    /// Discord has sent `ready`; events are flowing.
    Ready,
    /// The gateway task returned without an error.
    Stopped,
    /// The gateway task returned an error (bad token, disallowed intents, ...).
    Failed(String),
}

impl GatewayState {
    pub fn is_finished(&self) -> bool {
        matches!(self, GatewayState::Stopped | GatewayState::Failed(_))
    }
}

/// Creates a linked signal/monitor pair starting in [`GatewayState::Connecting`].
pub fn gateway_channel() -> (GatewaySignal, GatewayMonitor) {
    let (tx, rx) = watch::channel(GatewayState::Connecting);
    (GatewaySignal { tx: Arc::new(tx) }, GatewayMonitor { rx })
}

/// Write side, held by the event handler and the gateway task.
#[derive(Debug, Clone)]
pub struct GatewaySignal {
    tx: Arc<watch::Sender<GatewayState>>,
}

impl GatewaySignal {
    /// Marks the gateway ready. Ignored once the gateway has finished.
    pub fn ready(&self) {
        self.tx.send_if_modified(|state| {
            if state.is_finished() || *state == GatewayState::Ready {
                return false;
            }
            *state = GatewayState::Ready;
            true
        });
    }

    /// Records how the gateway task ended.
    pub fn finished(&self, result: Result<(), String>) {
        self.tx.send_replace(match result {
            Ok(()) => GatewayState::Stopped,
            Err(e) => GatewayState::Failed(e),
        });
    }
}

/// Read side, handed to whoever needs to follow the gateway.
#[derive(Debug, Clone)]
pub struct GatewayMonitor {
    rx: watch::Receiver<GatewayState>,
}

impl GatewayMonitor {
    pub fn state(&self) -> GatewayState {
        self.rx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow() == GatewayState::Ready
    }

    /// Waits for the first `ready`. Fails if the gateway ends before it.
    pub async fn ready(&mut self) -> Result<(), BridgeError> {
        let state = self
            .rx
            .wait_for(|state| *state != GatewayState::Connecting)
            .await
            .map(|state| state.clone())
            .unwrap_or(GatewayState::Stopped);

        match state {
            GatewayState::Ready => Ok(()),
            other => Err(ended_error(other)),
        }
    }

    /// Waits until the gateway ends and returns the error describing why.
    ///
    /// A gateway that stops while the relay still needs it is always an error.
    pub async fn closed(&mut self) -> BridgeError {
        let state = self
            .rx
            .wait_for(GatewayState::is_finished)
            .await
            .map(|state| state.clone())
            .unwrap_or(GatewayState::Stopped);
        ended_error(state)
    }
}

fn ended_error(state: GatewayState) -> BridgeError {
    let message = match state {
        GatewayState::Failed(reason) => format!("Discord gateway failed: {reason}"),
        _ => "Discord gateway closed unexpectedly".to_string(),
    };
    BridgeError::Channel {
        message,
        source: None,
    }
}
