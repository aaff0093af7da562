// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat platform traits: inbound event delivery and reply capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::InboundEvent;

/// Receives raw platform events from a channel adapter.
///
/// Called from the platform's event callback, so implementations must not
/// block or perform network I/O. Returns whether the event was admitted.
pub trait EventSink: Send + Sync {
    fn submit(&self, event: InboundEvent) -> bool;
}

/// A way to send text back to where a message came from.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, text: &str) -> Result<(), BridgeError>;
}

/// Adapter for a chat platform connection.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Connects to the platform and starts forwarding events to `sink`.
    ///
    /// Returns once the connection task is running.
    async fn connect(&mut self, sink: Arc<dyn EventSink>) -> Result<(), BridgeError>;
}
