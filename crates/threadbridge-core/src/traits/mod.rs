// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod assistant;
pub mod channel;

pub use adapter::PluginAdapter;
pub use assistant::AssistantBackend;
pub use channel::{ChannelAdapter, EventSink, ReplySink};
