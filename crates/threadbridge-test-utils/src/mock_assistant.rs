// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock assistant backend for deterministic testing.
//!
//! `MockAssistant` implements `AssistantBackend` with scripted outcomes and
//! records every call, enabling fast tests of the relay pipeline without
//! network access.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use threadbridge_core::traits::adapter::PluginAdapter;
use threadbridge_core::traits::assistant::AssistantBackend;
use threadbridge_core::types::{
    AdapterType, HealthStatus, MessageRole, RunId, RunStatus, ThreadId, ThreadMessage,
};
use threadbridge_core::BridgeError;

/// Scripted result of one `append_user_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Ok,
    /// The thread has an active run.
    Busy,
    /// Any other backend failure.
    Fail(String),
    /// Panic inside the backend call.
    Panic,
}

/// Scripted behaviour of one run, consumed in run creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScript {
    /// Statuses returned by successive polls. The last one repeats.
    pub statuses: Vec<RunStatus>,
    /// Assistant reply recorded on the thread for this run, if any.
    pub reply: Option<String>,
}

impl RunScript {
    /// A run that completes on its first poll with the given reply.
    pub fn completed(reply: impl Into<String>) -> Self {
        Self {
            statuses: vec![RunStatus::Completed],
            reply: Some(reply.into()),
        }
    }

    /// A run that reports each status in turn and produces no reply.
    pub fn statuses(statuses: Vec<RunStatus>) -> Self {
        Self {
            statuses,
            reply: None,
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateThread,
    Append { thread_id: ThreadId, content: String },
    CreateRun { thread_id: ThreadId, assistant_id: String },
    RetrieveRun { thread_id: ThreadId, run_id: RunId },
    ListMessages { thread_id: ThreadId },
    CancelRun { thread_id: ThreadId, run_id: RunId },
}

#[derive(Default)]
struct State {
    calls: Vec<BackendCall>,
    threads_created: u32,
    runs_created: u32,
    create_thread_failures: u32,
    list_failures: u32,
    append_outcomes: VecDeque<AppendOutcome>,
    run_scripts: VecDeque<RunScript>,
    /// Remaining statuses per run. The last entry is never popped.
    run_progress: HashMap<RunId, VecDeque<RunStatus>>,
    messages: HashMap<ThreadId, Vec<ThreadMessage>>,
}

/// A mock assistant backend with scripted outcomes.
///
/// Unscripted calls succeed: appends return `Ok`, and runs complete on the
/// first poll without producing a reply.
#[derive(Default)]
pub struct MockAssistant {
    state: Mutex<State>,
}

impl MockAssistant {
    /// Create a new mock backend with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next unscripted `append_user_message` call.
    pub async fn push_append(&self, outcome: AppendOutcome) {
        self.state.lock().await.append_outcomes.push_back(outcome);
    }

    /// Queue the script for the next run to be created.
    pub async fn push_run(&self, script: RunScript) {
        self.state.lock().await.run_scripts.push_back(script);
    }

    /// Make the next `count` thread creations fail.
    pub async fn fail_create_thread(&self, count: u32) {
        self.state.lock().await.create_thread_failures += count;
    }

    /// Make the next `count` message listings fail.
    pub async fn fail_list_messages(&self, count: u32) {
        self.state.lock().await.list_failures += count;
    }

    /// Place a message on a thread directly, as if an earlier run produced it.
    pub async fn seed_message(&self, thread_id: &ThreadId, message: ThreadMessage) {
        self.state
            .lock()
            .await
            .messages
            .entry(thread_id.clone())
            .or_default()
            .push(message);
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub async fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    /// Number of `append_user_message` calls.
    pub async fn append_count(&self) -> usize {
        self.count_calls(|c| matches!(c, BackendCall::Append { .. }))
            .await
    }

    /// Number of `create_thread` calls, failed ones included.
    pub async fn create_thread_count(&self) -> usize {
        self.count_calls(|c| matches!(c, BackendCall::CreateThread))
            .await
    }

    /// Contents appended so far, in order.
    pub async fn appended(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Append { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for MockAssistant {
    fn name(&self) -> &str {
        "mock-assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl AssistantBackend for MockAssistant {
    async fn create_thread(&self) -> Result<ThreadId, BridgeError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::CreateThread);
        if state.create_thread_failures > 0 {
            state.create_thread_failures -= 1;
            return Err(BridgeError::backend("mock: thread creation failed"));
        }
        state.threads_created += 1;
        Ok(ThreadId(format!("thread_{}", state.threads_created)))
    }

    async fn append_user_message(
        &self,
        thread_id: &ThreadId,
        content: &str,
    ) -> Result<(), BridgeError> {
        let outcome = {
            let mut state = self.state.lock().await;
            state.calls.push(BackendCall::Append {
                thread_id: thread_id.clone(),
                content: content.to_string(),
            });
            let outcome = state.append_outcomes.pop_front().unwrap_or(AppendOutcome::Ok);
            if outcome == AppendOutcome::Ok {
                state
                    .messages
                    .entry(thread_id.clone())
                    .or_default()
                    .push(ThreadMessage {
                        role: MessageRole::User,
                        run_id: None,
                        text: content.to_string(),
                    });
            }
            outcome
        };

        match outcome {
            AppendOutcome::Ok => Ok(()),
            AppendOutcome::Busy => Err(BridgeError::ThreadBusy {
                thread_id: thread_id.to_string(),
                message: format!("Can't add messages to {thread_id} while a run is active."),
            }),
            AppendOutcome::Fail(message) => Err(BridgeError::Backend {
                message,
                status: Some(500),
                source: None,
            }),
            AppendOutcome::Panic => panic!("mock: append panicked"),
        }
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &str,
    ) -> Result<RunId, BridgeError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::CreateRun {
            thread_id: thread_id.clone(),
            assistant_id: assistant_id.to_string(),
        });
        state.runs_created += 1;
        let run_id = RunId(format!("run_{}", state.runs_created));

        let script = state
            .run_scripts
            .pop_front()
            .unwrap_or_else(|| RunScript::statuses(vec![RunStatus::Completed]));
        if let Some(reply) = script.reply {
            state
                .messages
                .entry(thread_id.clone())
                .or_default()
                .push(ThreadMessage {
                    role: MessageRole::Assistant,
                    run_id: Some(run_id.clone()),
                    text: reply,
                });
        }
        let mut statuses: VecDeque<RunStatus> = script.statuses.into();
        if statuses.is_empty() {
            statuses.push_back(RunStatus::Completed);
        }
        state.run_progress.insert(run_id.clone(), statuses);
        Ok(run_id)
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunStatus, BridgeError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::RetrieveRun {
            thread_id: thread_id.clone(),
            run_id: run_id.clone(),
        });
        let progress = state
            .run_progress
            .get_mut(run_id)
            .ok_or_else(|| BridgeError::backend(format!("mock: no such run {run_id}")))?;
        let status = if progress.len() > 1 {
            progress.pop_front()
        } else {
            progress.front().copied()
        };
        status.ok_or_else(|| BridgeError::Internal("mock: empty run script".into()))
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, BridgeError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::ListMessages {
            thread_id: thread_id.clone(),
        });
        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(BridgeError::backend("mock: listing failed"));
        }
        Ok(state.messages.get(thread_id).cloned().unwrap_or_default())
    }

    async fn cancel_run(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), BridgeError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::CancelRun {
            thread_id: thread_id.clone(),
            run_id: run_id.clone(),
        });
        if let Some(progress) = state.run_progress.get_mut(run_id) {
            progress.clear();
            progress.push_back(RunStatus::Cancelled);
        }
        Ok(())
    }
}
