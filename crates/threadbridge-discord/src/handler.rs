// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event handling and reply delivery.
//!
//! Every Discord message is turned into an [`InboundEvent`] and handed to the
//! event sink. Admission rules live in the sink, not here.

use std::sync::Arc;

use serenity::all::{
    ChannelId as DiscordChannelId, Context, CreateMessage, EventHandler, GatewayIntents, Http,
    Message, MessageId, Ready,
};
use serenity::async_trait;
use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::{EventSink, ReplySink};
use threadbridge_core::types::{ChannelId, InboundEvent};
use tracing::{debug, info};

use crate::gateway::GatewaySignal;

/// Handler for Discord gateway events.
pub struct DiscordHandler {
    sink: Arc<dyn EventSink>,
    gateway: GatewaySignal,
}

impl DiscordHandler {
    pub fn new(sink: Arc<dyn EventSink>, gateway: GatewaySignal) -> Self {
        Self { sink, gateway }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.gateway.ready();
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let event = RawMessage::from(&msg).into_event(ctx.http.clone());
        let channel_id = msg.channel_id.get();
        if self.sink.submit(event) {
            debug!(channel_id, message_id = msg.id.get(), "discord message accepted");
        }
    }
}

/// The parts of a Discord message the bridge relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub author_id: u64,
    pub author_is_bot: bool,
    pub channel_id: DiscordChannelId,
    pub message_id: MessageId,
    pub content: String,
}

impl From<&Message> for RawMessage {
    fn from(msg: &Message) -> Self {
        Self {
            author_id: msg.author.id.get(),
            author_is_bot: msg.author.bot,
            channel_id: msg.channel_id,
            message_id: msg.id,
            content: msg.content.clone(),
        }
    }
}

impl RawMessage {
    /// Builds the platform-neutral event, with a reply sink bound to this message.
    pub fn into_event(self, http: Arc<Http>) -> InboundEvent {
        InboundEvent {
            author_id: self.author_id.to_string(),
            author_is_bot: self.author_is_bot,
            channel_id: ChannelId(self.channel_id.to_string()),
            content: self.content,
            reply: Arc::new(DiscordReply::new(http, self.channel_id, self.message_id)),
        }
    }
}

/// Posts replies into a channel as a reply to the originating message.
pub struct DiscordReply {
    http: Arc<Http>,
    channel_id: DiscordChannelId,
    message_id: MessageId,
}

impl DiscordReply {
    pub fn new(http: Arc<Http>, channel_id: DiscordChannelId, message_id: MessageId) -> Self {
        Self {
            http,
            channel_id,
            message_id,
        }
    }
}

#[async_trait]
impl ReplySink for DiscordReply {
    async fn reply(&self, text: &str) -> Result<(), BridgeError> {
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((self.channel_id, self.message_id));

        self.channel_id
            .send_message(&*self.http, builder)
            .await
            .map(|_| ())
            .map_err(|e| BridgeError::Channel {
                message: format!("failed to send Discord reply: {e}"),
                source: Some(Box::new(e)),
            })
    }
}
