// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `start_once` (§4.1): spawn a job's command once, race its exit against
//! cancellation, and resolve to an [`Outcome`].

use ignite_adapters::{Executor, GroupSignal, SpawnSpec};
use ignite_core::{JobPhaseReason, JobState, Outcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Build the spawn spec for a job's current config (§3 shared fields).
pub fn spawn_spec(state: &JobState) -> SpawnSpec {
    let cfg = &state.config().base;
    SpawnSpec {
        job_name: cfg.name.clone(),
        command: cfg.command.clone(),
        args: cfg.args.clone(),
        env: cfg.env.clone(),
        working_dir: cfg.working_dir.clone(),
        stdout_path: cfg.stdout_path.clone(),
        stderr_path: cfg.stderr_path.clone(),
        timestamp_format: cfg.timestamp_format.clone(),
    }
}

/// Runs one attempt of a job's command to completion (or interruption).
/// `cancellation` is the per-attempt inner token (§4.2 step 2: a child of
/// the root cancellation, so either a parent shutdown or an API-triggered
/// restart/stop can interrupt this specific attempt).
pub async fn start_once<E: Executor>(
    executor: &E,
    state: &JobState,
    cancellation: &CancellationToken,
) -> Outcome {
    let spec = spawn_spec(state);
    let handle = match executor.spawn(spec).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(job = state.name(), error = %err, "failed to start job");
            return Outcome::ExitedErr(None);
        }
    };
    state.set_child_pid(Some(handle.pid()));
    // §3 invariant 4: phase must already read `started` once child_pid is
    // non-empty, not just after the attempt concludes.
    state.set_phase(JobPhaseReason::Started, chrono::Utc::now());

    let outcome = tokio::select! {
        biased;
        _ = cancellation.cancelled() => {
            handle_cancellation(executor, state, &handle).await
        }
        wait_result = executor.wait(&handle) => {
            handle_exit(executor, state, &handle, wait_result)
        }
    };

    state.set_child_pid(None);
    outcome
}

async fn handle_cancellation<E: Executor>(
    executor: &E,
    state: &JobState,
    handle: &ignite_adapters::ChildHandle,
) -> Outcome {
    let _ = executor.signal_group(handle.pid(), GroupSignal::Term);

    let escalate = tokio::time::timeout(SHUTDOWN_GRACE, executor.wait(handle)).await;
    if escalate.is_err() {
        tracing::warn!(job = state.name(), "job did not exit after SIGTERM, sending SIGKILL");
        let _ = executor.signal_group(handle.pid(), GroupSignal::Kill);
        let _ = executor.wait(handle).await;
    }
    Outcome::CancelledByParent
}

fn handle_exit<E: Executor>(
    executor: &E,
    state: &JobState,
    handle: &ignite_adapters::ChildHandle,
    wait_result: std::io::Result<ignite_adapters::ExitOutcome>,
) -> Outcome {
    // Best-effort cleanup of any stragglers left in the process group;
    // "no such process" is swallowed by `signal_group` itself (§4.1 step 5).
    let _ = executor.signal_group(handle.pid(), GroupSignal::Term);

    if state.take_restart_flag() {
        return Outcome::RestartRequested;
    }
    if state.stop_requested() {
        return Outcome::StopRequested;
    }

    match wait_result {
        Ok(outcome) if outcome.success => Outcome::ExitedOk,
        Ok(outcome) => Outcome::ExitedErr(outcome.code),
        Err(err) => {
            tracing::error!(job = state.name(), error = %err, "error waiting for job");
            Outcome::ExitedErr(None)
        }
    }
}
