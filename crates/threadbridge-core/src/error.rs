// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the threadbridge relay.

use thiserror::Error;

/// The primary error type used across all threadbridge adapter traits and core operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The backend refused to append a message because the thread has an active run.
    ///
    /// This is the only recoverable backend condition; the message handler
    /// retries it exactly once.
    #[error("thread {thread_id} is busy: {message}")]
    ThreadBusy { thread_id: String, message: String },

    /// AI backend errors (HTTP failure, unexpected status, malformed body).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat platform errors (gateway failure, reply delivery).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns true for the busy-thread condition.
    pub fn is_busy(&self) -> bool {
        matches!(self, BridgeError::ThreadBusy { .. })
    }

    /// Shorthand for a backend error without an HTTP status or source.
    pub fn backend(message: impl Into<String>) -> Self {
        BridgeError::Backend {
            message: message.into(),
            status: None,
            source: None,
        }
    }
}
