// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply sink that captures outbound text for assertions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use threadbridge_core::traits::channel::ReplySink;
use threadbridge_core::BridgeError;

/// A reply sink that records every delivered text.
///
/// Clones share the same log, so one recorder can stand in for a whole
/// channel across several messages.
#[derive(Clone, Default)]
pub struct RecordingReply {
    sent: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingReply {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose deliveries fail until [`set_failing`](Self::set_failing) is cleared.
    pub fn failing() -> Self {
        let reply = Self::default();
        reply.set_failing(true);
        reply
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Texts delivered so far. Failed deliveries are not recorded.
    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl ReplySink for RecordingReply {
    async fn reply(&self, text: &str) -> Result<(), BridgeError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BridgeError::Channel {
                message: "mock: delivery failed".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_the_log() {
        let reply = RecordingReply::new();
        let other = reply.clone();
        other.reply("one").await.unwrap();
        reply.reply("two").await.unwrap();
        assert_eq!(reply.sent().await, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn failing_sink_records_nothing() {
        let reply = RecordingReply::failing();
        assert!(reply.reply("lost").await.is_err());
        assert_eq!(reply.sent_count().await, 0);

        reply.set_failing(false);
        reply.reply("kept").await.unwrap();
        assert_eq!(reply.sent().await, vec!["kept"]);
    }
}
