// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel to thread mapping.
//!
//! Each allow-listed channel talks to exactly one backend thread for the life
//! of the process. Threads are created lazily on the first message.

use std::collections::HashMap;

use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::AssistantBackend;
use threadbridge_core::types::{ChannelId, ThreadId};
use tracing::{debug, info};

/// In-memory directory of conversation threads, keyed by channel.
///
/// Owned by the dispatch loop and lent to the handler by `&mut`.
#[derive(Debug, Default)]
pub struct ConversationDirectory {
    threads: HashMap<ChannelId, ThreadId>,
}

impl ConversationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the channel's thread, creating it on the backend if absent.
    ///
    /// A failed creation leaves the directory unchanged, so the next call
    /// tries again.
    pub async fn resolve_or_create(
        &mut self,
        channel_id: &ChannelId,
        backend: &dyn AssistantBackend,
    ) -> Result<ThreadId, BridgeError> {
        if let Some(thread_id) = self.threads.get(channel_id) {
            debug!(
                channel_id = channel_id.as_str(),
                thread_id = thread_id.as_str(),
                "reusing conversation thread"
            );
            return Ok(thread_id.clone());
        }

        let thread_id = backend.create_thread().await?;
        info!(
            channel_id = channel_id.as_str(),
            thread_id = thread_id.as_str(),
            "created conversation thread"
        );
        self.threads.insert(channel_id.clone(), thread_id.clone());
        Ok(thread_id)
    }

    pub fn get(&self, channel_id: &ChannelId) -> Option<&ThreadId> {
        self.threads.get(channel_id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
