// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single consumer of the message queue.
//!
//! Messages are handled strictly one at a time, in arrival order, with a
//! pause after each. A failing or panicking handler never stops the loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use threadbridge_core::types::PendingMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::directory::ConversationDirectory;
use crate::handler::{Delivery, MessageHandler};
use crate::queue::QueueReceiver;

/// Counters describing a finished dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages taken off the queue and handed to the handler.
    pub processed: usize,
    /// Of those, how many ended in an error or a panic.
    pub failed: usize,
    /// Messages still queued at shutdown and never handled.
    pub dropped: usize,
}

/// Drains the message queue through a [`MessageHandler`].
pub struct DispatchLoop {
    queue: QueueReceiver,
    handler: MessageHandler,
    directory: ConversationDirectory,
    throttle: Duration,
}

impl DispatchLoop {
    pub fn new(queue: QueueReceiver, handler: MessageHandler, throttle: Duration) -> Self {
        Self {
            queue,
            handler,
            directory: ConversationDirectory::new(),
            throttle,
        }
    }

    /// Runs until `cancel` fires or every queue sender is dropped.
    ///
    /// A message already being handled when `cancel` fires runs to completion.
    pub async fn run(mut self, cancel: CancellationToken) -> DispatchReport {
        info!(throttle_ms = self.throttle.as_millis() as u64, "dispatch loop running");
        let mut report = DispatchReport::default();

        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatch loop");
                    break;
                }
                next = self.queue.next() => match next {
                    Some(message) => message,
                    None => {
                        info!("message queue closed, stopping dispatch loop");
                        break;
                    }
                },
            };

            report.processed += 1;
            if !self.process(message).await {
                report.failed += 1;
            }

            if !self.throttle.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("shutdown signal received, stopping dispatch loop");
                        break;
                    }
                    _ = tokio::time::sleep(self.throttle) => {}
                }
            }
        }

        report.dropped = self.queue.close_and_discard();
        if report.dropped > 0 {
            warn!(dropped = report.dropped, "queued messages discarded at shutdown");
        }
        info!(
            processed = report.processed,
            failed = report.failed,
            threads = self.directory.len(),
            "dispatch loop stopped"
        );
        report
    }

    /// Handles one message, containing errors and panics. Returns false on failure.
    async fn process(&mut self, message: PendingMessage) -> bool {
        let outcome = AssertUnwindSafe(self.handler.handle(&mut self.directory, &message))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(delivery)) => {
                match delivery {
                    Delivery::Sent { .. } => debug!(
                        channel_id = message.channel_id.as_str(),
                        "message handled"
                    ),
                    Delivery::Failed { .. } => debug!(
                        channel_id = message.channel_id.as_str(),
                        "message handled, reply not delivered"
                    ),
                    Delivery::Skipped => debug!(
                        channel_id = message.channel_id.as_str(),
                        "message skipped"
                    ),
                }
                true
            }
            Ok(Err(e)) => {
                error!(
                    channel_id = message.channel_id.as_str(),
                    error = %e,
                    "failed to handle message"
                );
                false
            }
            Err(panic) => {
                error!(
                    channel_id = message.channel_id.as_str(),
                    panic = panic_message(panic.as_ref()),
                    "message handler panicked"
                );
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
