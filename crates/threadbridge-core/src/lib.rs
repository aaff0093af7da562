// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the threadbridge relay.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by the relay pipeline and its adapters. The chat platform and the
//! assistant backend are both reached through traits defined here.

pub mod error;
pub mod replies;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BridgeError;
pub use types::{
    AdapterType, ChannelId, HealthStatus, InboundEvent, MessageRole, PendingMessage, RunId,
    RunStatus, ThreadId, ThreadMessage,
};

pub use traits::{AssistantBackend, ChannelAdapter, EventSink, PluginAdapter, ReplySink};
