// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for threadbridge integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! Discord or the assistants API.
//!
//! # Components
//!
//! - [`MockAssistant`] - scripted assistant backend that records every call
//! - [`RecordingReply`] - reply sink that captures delivered text

pub mod mock_assistant;
pub mod recording_reply;

use std::sync::Arc;

use threadbridge_core::types::{ChannelId, InboundEvent, PendingMessage};

pub use mock_assistant::{AppendOutcome, BackendCall, MockAssistant, RunScript};
pub use recording_reply::RecordingReply;

/// Build an inbound event from a human author.
pub fn user_event(channel: &str, content: &str, reply: &RecordingReply) -> InboundEvent {
    InboundEvent {
        author_id: "user-1".to_string(),
        author_is_bot: false,
        channel_id: ChannelId::from(channel),
        content: content.to_string(),
        reply: Arc::new(reply.clone()),
    }
}

/// Build an inbound event from a bot author.
pub fn bot_event(channel: &str, content: &str, reply: &RecordingReply) -> InboundEvent {
    InboundEvent {
        author_is_bot: true,
        author_id: "bot-1".to_string(),
        ..user_event(channel, content, reply)
    }
}

/// Build an already-admitted message.
pub fn pending(channel: &str, content: &str, reply: &RecordingReply) -> PendingMessage {
    PendingMessage::from(user_event(channel, content, reply))
}
