// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FIFO message queue between the inbound filter and the dispatch loop.
//!
//! Unbounded so the gateway callback never waits. Only the single dispatch
//! loop holds the receiving half.

use threadbridge_core::types::PendingMessage;
use tokio::sync::mpsc;
use tracing::warn;

/// Creates a connected sender/receiver pair.
pub fn message_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: mpsc::UnboundedSender<PendingMessage>,
}

impl QueueSender {
    /// Appends a message to the back of the queue.
    ///
    /// Returns `false` if the dispatch loop has already stopped.
    pub fn enqueue(&self, message: PendingMessage) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                warn!(
                    channel_id = message.channel_id.as_str(),
                    "dispatch loop stopped, message discarded"
                );
                false
            }
        }
    }
}

/// Consumer half, owned by the dispatch loop.
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<PendingMessage>,
}

impl QueueReceiver {
    /// Waits for the next message. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<PendingMessage> {
        self.rx.recv().await
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Closes the queue and discards whatever is still waiting.
    ///
    /// Returns the number of discarded messages.
    pub fn close_and_discard(&mut self) -> usize {
        self.rx.close();
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbridge_test_utils::{pending, RecordingReply};

    #[tokio::test]
    async fn preserves_insertion_order() {
        let (tx, mut rx) = message_queue();
        let reply = RecordingReply::new();
        for text in ["one", "two", "three"] {
            assert!(tx.enqueue(pending("1", text, &reply)));
        }
        assert_eq!(rx.len(), 3);
        assert_eq!(rx.next().await.unwrap().content, "one");
        assert_eq!(rx.next().await.unwrap().content, "two");
        assert_eq!(rx.next().await.unwrap().content, "three");
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn next_returns_none_when_senders_dropped() {
        let (tx, mut rx) = message_queue();
        drop(tx);
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn enqueue_fails_after_close() {
        let (tx, mut rx) = message_queue();
        let reply = RecordingReply::new();
        tx.enqueue(pending("1", "waiting", &reply));

        assert_eq!(rx.close_and_discard(), 1);
        assert!(!tx.enqueue(pending("1", "late", &reply)));
    }
}
