// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart controller (§4.2): drives a common job's `start_once` loop with
//! crash-loop backoff.

use crate::start_once::start_once;
use ignite_adapters::Executor;
use ignite_core::{backoff, JobPhaseReason, JobState, MaxRetriesExceeded, Outcome};
use tokio_util::sync::CancellationToken;

/// Runs `job` until it's stopped, completes (one-time success), or exhausts
/// its retry budget. `root_cancel` is the supervisor's cancellation; a fresh
/// child of it is created per attempt so an API-triggered restart/stop only
/// interrupts the current attempt, not the whole controller.
pub async fn run<E: Executor>(
    executor: &E,
    state: &JobState,
    root_cancel: &CancellationToken,
) -> Result<(), MaxRetriesExceeded> {
    let mut attempts: u32 = 0;
    let mut backoff_duration = std::time::Duration::from_secs(1);
    let max_attempts = state.config().effective_max_attempts();
    let one_time = state.config().one_time;
    let can_fail = state.config().base.can_fail;

    loop {
        if state.stop_requested() {
            state.set_phase(JobPhaseReason::Stopped, now());
            return Ok(());
        }

        state.reset_stop_flag();
        // Child of the root token: a parent shutdown cancels it too, but
        // `start_once` itself races this token against the child process
        // exit, so it always gets to run its own SIGTERM/SIGKILL cleanup
        // before returning (rather than being abandoned mid-shutdown here).
        let attempt_cancel = root_cancel.child_token();
        let outcome = start_once(executor, state, &attempt_cancel).await;

        match outcome {
            Outcome::ExitedOk if one_time => {
                state.set_phase(JobPhaseReason::Completed, now());
                return Ok(());
            }
            Outcome::ExitedOk => {
                tracing::warn!(job = state.name(), "job exited without errors");
            }
            Outcome::RestartRequested => {
                continue;
            }
            Outcome::StopRequested => {
                state.set_phase(JobPhaseReason::Stopped, now());
                return Ok(());
            }
            // Both fall through to attempt accounting (§4.2 step 4); the
            // backoff sleep below races the same root cancellation, so a
            // parent shutdown still unwinds promptly.
            Outcome::CancelledByParent | Outcome::ExitedErr(_) => {}
        }

        attempts += 1;
        let retry = match max_attempts {
            None => true,
            Some(max) => attempts < max,
        };

        if retry {
            tracing::info!(
                job = state.name(),
                attempts,
                max = ?max_attempts,
                "remaining attempts"
            );
            // next_backoff() is applied before the sleep, not after, so the
            // first wait is the documented 2s floor rather than the 1s seed.
            backoff_duration = backoff::next_backoff(backoff_duration);
            state.set_phase(JobPhaseReason::CrashLooping, now());
            tokio::select! {
                _ = tokio::time::sleep(backoff_duration) => {}
                _ = root_cancel.cancelled() => return Ok(()),
                // No child alive to signal during backoff; stop/restart
                // wake the sleep directly instead (§5).
                _ = state.interrupted() => {
                    state.take_restart_flag();
                }
            }
            continue;
        }

        state.set_phase(JobPhaseReason::Failed, now());
        if can_fail {
            tracing::warn!(job = state.name(), max = ?max_attempts, "reached max retries");
            return Ok(());
        }
        return Err(MaxRetriesExceeded {
            job: state.name().to_string(),
        });
    }
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
