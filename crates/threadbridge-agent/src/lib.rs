// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relay pipeline for the threadbridge bridge.
//!
//! Inbound chat events flow through:
//! - [`InboundFilter`], which drops bots, blank messages and foreign channels
//! - a FIFO [`queue`] with a single consumer
//! - [`DispatchLoop`], which handles one message at a time with a throttle
//! - [`MessageHandler`], which appends to the channel's thread, runs the
//!   assistant, and posts the reply

pub mod directory;
pub mod dispatch;
pub mod filter;
pub mod handler;
pub mod queue;
pub mod run;
pub mod shutdown;

pub use directory::ConversationDirectory;
pub use dispatch::{DispatchLoop, DispatchReport};
pub use filter::{AllowList, DropReason, InboundFilter};
pub use handler::{select_reply, Attempt, Delivery, HandlerSettings, MessageHandler};
pub use queue::{message_queue, QueueReceiver, QueueSender};
pub use run::{RunOutcome, RunPoller};
