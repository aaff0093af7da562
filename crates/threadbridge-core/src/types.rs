// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the relay pipeline and its adapters.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::traits::ReplySink;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Borrows the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Chat platform channel identifier. Join key into the conversation directory.
    ChannelId
);

string_id!(
    /// Backend-issued conversation thread identifier.
    ThreadId
);

string_id!(
    /// Backend-issued run identifier.
    RunId
);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Assistant,
}

/// Author role of a message stored on a backend thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Status of a backend run.
///
/// A run starts in an active status and ends in exactly one terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
    /// A status this build does not know about; treated as still active.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns true once no further status change can occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Completed
                | RunStatus::Expired
                | RunStatus::Incomplete
        )
    }
}

/// A message as listed from a backend thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: MessageRole,
    /// The run that produced the message; `None` for user turns.
    pub run_id: Option<RunId>,
    /// Concatenated text content.
    pub text: String,
}

/// A raw message event from the chat platform, before filtering.
#[derive(Clone)]
pub struct InboundEvent {
    pub author_id: String,
    pub author_is_bot: bool,
    pub channel_id: ChannelId,
    pub content: String,
    pub reply: Arc<dyn ReplySink>,
}

impl fmt::Debug for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundEvent")
            .field("author_id", &self.author_id)
            .field("author_is_bot", &self.author_is_bot)
            .field("channel_id", &self.channel_id)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

/// An admitted message waiting in, or taken from, the dispatch queue.
#[derive(Clone)]
pub struct PendingMessage {
    pub sender_id: String,
    pub channel_id: ChannelId,
    pub content: String,
    /// Where the reply for this message is delivered.
    pub reply: Arc<dyn ReplySink>,
}

impl fmt::Debug for PendingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingMessage")
            .field("sender_id", &self.sender_id)
            .field("channel_id", &self.channel_id)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl From<InboundEvent> for PendingMessage {
    fn from(event: InboundEvent) -> Self {
        Self {
            sender_id: event.author_id,
            channel_id: event.channel_id,
            content: event.content,
            reply: event.reply,
        }
    }
}
