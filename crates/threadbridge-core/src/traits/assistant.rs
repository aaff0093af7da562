// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant backend trait: threads, messages and runs.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{RunId, RunStatus, ThreadId, ThreadMessage};

/// A conversational AI backend organised around threads and runs.
///
/// The usage protocol is: create a thread once per channel, append a user
/// message, start a run, poll it until terminal, then list the thread's
/// messages to find what the run produced.
#[async_trait]
pub trait AssistantBackend: PluginAdapter {
    /// Creates a new, empty conversation thread.
    async fn create_thread(&self) -> Result<ThreadId, BridgeError>;

    /// Appends a user turn to a thread.
    ///
    /// Returns [`BridgeError::ThreadBusy`] when the thread has an active run.
    async fn append_user_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> Result<(), BridgeError>;

    /// Starts a run of `assistant_id` against the thread's current state.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> Result<RunId, BridgeError>;

    /// Fetches the current status of a run.
    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunStatus, BridgeError>;

    /// Lists the thread's messages, oldest first.
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, BridgeError>;

    /// Asks the backend to cancel a run that is still active.
    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), BridgeError>;
}
