// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event admission.
//!
//! Decides whether a raw platform event should be relayed and, if so, places
//! it on the message queue. Runs inside the gateway callback, so it never
//! touches the network and never waits.

use std::collections::HashSet;
use std::sync::Arc;

use threadbridge_core::traits::EventSink;
use threadbridge_core::types::{ChannelId, InboundEvent, PendingMessage};
use tracing::debug;

use crate::queue::QueueSender;

/// The set of channels the bridge listens in. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    channels: Arc<HashSet<ChannelId>>,
}

impl AllowList {
    pub fn new(channels: impl IntoIterator<Item = ChannelId>) -> Self {
        Self {
            channels: Arc::new(channels.into_iter().collect()),
        }
    }

    /// Builds an allow-list from the configured channel id strings.
    pub fn from_config(channels: &[String]) -> Self {
        Self::new(channels.iter().map(|c| ChannelId::from(c.as_str())))
    }

    pub fn contains(&self, channel_id: &ChannelId) -> bool {
        self.channels.contains(channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Why an inbound event was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DropReason {
    BotAuthor,
    EmptyContent,
    ChannelNotAllowed,
}

/// Filters raw platform events and enqueues the ones worth relaying.
pub struct InboundFilter {
    allow_list: AllowList,
    queue: QueueSender,
}

impl InboundFilter {
    pub fn new(allow_list: AllowList, queue: QueueSender) -> Self {
        Self { allow_list, queue }
    }

    /// Applies the admission rules without enqueuing.
    pub fn admit(&self, event: InboundEvent) -> Option<PendingMessage> {
        match self.check(&event) {
            Ok(()) => Some(PendingMessage::from(event)),
            Err(reason) => {
                debug!(
                    channel_id = event.channel_id.as_str(),
                    author_id = event.author_id.as_str(),
                    reason = %reason,
                    "inbound event dropped"
                );
                None
            }
        }
    }

    fn check(&self, event: &InboundEvent) -> Result<(), DropReason> {
        if event.author_is_bot {
            return Err(DropReason::BotAuthor);
        }
        if event.content.trim().is_empty() {
            return Err(DropReason::EmptyContent);
        }
        if !self.allow_list.contains(&event.channel_id) {
            return Err(DropReason::ChannelNotAllowed);
        }
        Ok(())
    }
}

impl EventSink for InboundFilter {
    fn submit(&self, event: InboundEvent) -> bool {
        match self.admit(event) {
            Some(message) => {
                debug!(
                    channel_id = message.channel_id.as_str(),
                    "inbound message queued"
                );
                self.queue.enqueue(message)
            }
            None => false,
        }
    }
}
