// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message relay: thread resolution, append with busy retry, run, reply.

use std::sync::Arc;
use std::time::Duration;

use threadbridge_config::model::DispatchConfig;
use threadbridge_core::error::BridgeError;
use threadbridge_core::replies::{GAVE_UP_FALLBACK, NO_REPLY_FALLBACK, TOO_LONG_FALLBACK};
use threadbridge_core::traits::AssistantBackend;
use threadbridge_core::types::{
    MessageRole, PendingMessage, RunId, RunStatus, ThreadId, ThreadMessage,
};
use tracing::{debug, error, info, warn};

use crate::directory::ConversationDirectory;
use crate::filter::AllowList;
use crate::run::{RunOutcome, RunPoller};

/// Which append attempt is in progress. There is never a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

impl Attempt {
    pub fn number(self) -> u8 {
        match self {
            Attempt::First => 1,
            Attempt::Retry => 2,
        }
    }
}

/// What happened to the reply for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The text was posted to the originating channel.
    Sent { text: String },
    /// The text was produced but posting it failed.
    Failed { text: String },
    /// The channel is not allow-listed; nothing was done.
    Skipped,
}

/// Tunables for [`MessageHandler`].
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub assistant_id: String,
    pub busy_retry_delay: Duration,
    pub max_reply_chars: usize,
    pub poller: RunPoller,
}

impl HandlerSettings {
    pub fn from_config(assistant_id: impl Into<String>, dispatch: &DispatchConfig) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            busy_retry_delay: dispatch.busy_retry_delay(),
            max_reply_chars: dispatch.max_reply_chars,
            poller: RunPoller::from_config(dispatch),
        }
    }
}

/// Relays one message to the assistant backend and posts the reply.
pub struct MessageHandler {
    backend: Arc<dyn AssistantBackend>,
    allow_list: AllowList,
    settings: HandlerSettings,
}

impl MessageHandler {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        allow_list: AllowList,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            backend,
            allow_list,
            settings,
        }
    }

    /// Processes one message from start to reply.
    ///
    /// Returns `Err` when the backend fails before a reply text exists. A
    /// failed delivery is not an error; it is reported as [`Delivery::Failed`].
    pub async fn handle(
        &self,
        directory: &mut ConversationDirectory,
        message: &PendingMessage,
    ) -> Result<Delivery, BridgeError> {
        let Some(thread_id) = self.append_with_retry(directory, message).await? else {
            return Ok(Delivery::Skipped);
        };

        let run_id = self
            .backend
            .create_run(&thread_id, &self.settings.assistant_id)
            .await?;
        debug!(
            channel_id = message.channel_id.as_str(),
            thread_id = thread_id.as_str(),
            run_id = run_id.as_str(),
            "run started"
        );

        let text = match self
            .settings
            .poller
            .wait(self.backend.as_ref(), &thread_id, &run_id)
            .await?
        {
            RunOutcome::Finished(status) => {
                if status != RunStatus::Completed {
                    info!(
                        thread_id = thread_id.as_str(),
                        run_id = run_id.as_str(),
                        status = %status,
                        "run ended without completing"
                    );
                }
                let messages = self.backend.list_messages(&thread_id).await?;
                select_reply(&messages, &run_id, self.settings.max_reply_chars)
            }
            RunOutcome::GaveUp { .. } => {
                self.cancel_quietly(&thread_id, &run_id).await;
                GAVE_UP_FALLBACK.to_string()
            }
        };

        Ok(deliver(message, text).await)
    }

    /// Steps 1-3: admissibility, thread resolution and append, retried once on busy.
    ///
    /// Returns `None` when the channel is not allow-listed.
    async fn append_with_retry(
        &self,
        directory: &mut ConversationDirectory,
        message: &PendingMessage,
    ) -> Result<Option<ThreadId>, BridgeError> {
        let mut attempt = Attempt::First;
        loop {
            if !self.allow_list.contains(&message.channel_id) {
                debug!(
                    channel_id = message.channel_id.as_str(),
                    "channel not allow-listed, skipping"
                );
                return Ok(None);
            }

            let thread_id = directory
                .resolve_or_create(&message.channel_id, self.backend.as_ref())
                .await?;

            match self
                .backend
                .append_user_message(&thread_id, &message.content)
                .await
            {
                Ok(()) => {
                    debug!(
                        thread_id = thread_id.as_str(),
                        attempt = attempt.number(),
                        "user message appended"
                    );
                    return Ok(Some(thread_id));
                }
                Err(e) if e.is_busy() && attempt == Attempt::First => {
                    warn!(
                        channel_id = message.channel_id.as_str(),
                        thread_id = thread_id.as_str(),
                        delay_ms = self.settings.busy_retry_delay.as_millis() as u64,
                        "thread busy, retrying once"
                    );
                    tokio::time::sleep(self.settings.busy_retry_delay).await;
                    attempt = Attempt::Retry;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn cancel_quietly(&self, thread_id: &ThreadId, run_id: &RunId) {
        if let Err(e) = self.backend.cancel_run(thread_id, run_id).await {
            warn!(
                thread_id = thread_id.as_str(),
                run_id = run_id.as_str(),
                error = %e,
                "failed to cancel abandoned run"
            );
        }
    }
}

/// Picks the text to post for `run_id` from a thread's messages (oldest first).
///
/// Uses the latest non-empty assistant message produced by that run, or the
/// no-reply fallback. Anything longer than `max_chars` characters is replaced
/// by the too-long fallback.
pub fn select_reply(messages: &[ThreadMessage], run_id: &RunId, max_chars: usize) -> String {
    let candidate = messages
        .iter()
        .rev()
        .find(|m| {
            m.role == MessageRole::Assistant
                && m.run_id.as_ref() == Some(run_id)
                && !m.text.trim().is_empty()
        })
        .map_or(NO_REPLY_FALLBACK, |m| m.text.as_str());

    if candidate.chars().count() > max_chars {
        TOO_LONG_FALLBACK.to_string()
    } else {
        candidate.to_string()
    }
}

async fn deliver(message: &PendingMessage, text: String) -> Delivery {
    match message.reply.reply(&text).await {
        Ok(()) => {
            debug!(
                channel_id = message.channel_id.as_str(),
                chars = text.chars().count(),
                "reply delivered"
            );
            Delivery::Sent { text }
        }
        Err(e) => {
            error!(
                channel_id = message.channel_id.as_str(),
                error = %e,
                "failed to deliver reply"
            );
            Delivery::Failed { text }
        }
    }
}
