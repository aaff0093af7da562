// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run status polling with a deadline and a poll cap.

use std::time::Duration;

use threadbridge_config::model::DispatchConfig;
use threadbridge_core::error::BridgeError;
use threadbridge_core::traits::AssistantBackend;
use threadbridge_core::types::{RunId, RunStatus, ThreadId};
use tokio::time::Instant;
use tracing::{debug, warn};

/// How a wait on a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run reached this terminal status.
    Finished(RunStatus),
    /// The deadline or the poll cap was hit while the run was still active.
    GaveUp { polls: u32, elapsed: Duration },
}

/// Polls a run until it reaches a terminal status.
#[derive(Debug, Clone, Copy)]
pub struct RunPoller {
    interval: Duration,
    timeout: Duration,
    max_polls: u32,
}

impl RunPoller {
    pub fn new(interval: Duration, timeout: Duration, max_polls: u32) -> Self {
        Self {
            interval,
            timeout,
            max_polls: max_polls.max(1),
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.poll_interval(),
            config.run_timeout(),
            config.max_poll_attempts,
        )
    }

    /// Waits for `run_id` to finish.
    ///
    /// The status is read before each pause, so a run that is already
    /// terminal costs exactly one poll. Backend errors end the wait.
    pub async fn wait(
        &self,
        backend: &dyn AssistantBackend,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<RunOutcome, BridgeError> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let status = backend.retrieve_run(thread_id, run_id).await?;
            polls += 1;
            debug!(
                thread_id = thread_id.as_str(),
                run_id = run_id.as_str(),
                status = %status,
                poll = polls,
                "run status polled"
            );

            if status.is_terminal() {
                return Ok(RunOutcome::Finished(status));
            }

            let elapsed = started.elapsed();
            if polls >= self.max_polls || elapsed >= self.timeout {
                warn!(
                    thread_id = thread_id.as_str(),
                    run_id = run_id.as_str(),
                    status = %status,
                    polls,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "giving up on run"
                );
                return Ok(RunOutcome::GaveUp { polls, elapsed });
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
