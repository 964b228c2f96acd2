// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges the proxy's `JobActivator` trait (§4.5 "Listener task" step 1) to
//! a lazy job's cold-start path: a double-checked lock around a dedicated
//! `start_once` task, published to waiting connections once the child
//! handle exists (or the attempt fails).

use async_trait::async_trait;
use ignite_adapters::{ChildHandle, Executor, JobActivator};
use ignite_core::{JobPhaseReason, JobState};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Slot the reaper reads `current()` from. Shared between one lazy job's
/// activator and its reaper task, so the reaper always sees the live child
/// (or `None` while dormant) rather than a handle captured at spawn time.
pub type CurrentChild = Arc<Mutex<Option<Arc<ChildHandle>>>>;

/// One per lazy job. Shared between every listener task forwarding
/// connections to it.
pub struct LazyActivator<E: Executor> {
    state: JobState,
    executor: E,
    current: CurrentChild,
    /// Root cancellation for this job; a fresh child is handed to each
    /// `start_once` invocation so an API stop interrupts only that attempt.
    root_cancel: CancellationToken,
}

impl<E: Executor> LazyActivator<E> {
    pub fn new(state: JobState, executor: E, current: CurrentChild, root_cancel: CancellationToken) -> Self {
        Self {
            state,
            executor,
            current,
            root_cancel,
        }
    }
}

#[async_trait]
impl<E: Executor> JobActivator for LazyActivator<E> {
    async fn ensure_started(&self) -> std::io::Result<()> {
        // Yes, this is checked twice: the fast unlocked path covers the
        // overwhelmingly common case of a connection arriving while the
        // job is already warm.
        if self.state.is_running() {
            return Ok(());
        }

        let guard = self.state.lazy_start_lock().lock();
        if self.state.is_running() {
            drop(guard);
            return Ok(());
        }

        let (published_tx, published_rx) = oneshot::channel();
        let state = self.state.clone();
        let executor = self.executor.clone();
        let current = self.current.clone();
        let attempt_cancel = self.root_cancel.child_token();

        self.state
            .set_phase(JobPhaseReason::AwaitingReadiness, chrono::Utc::now());
        self.state.reset_stop_flag();

        tokio::spawn(async move {
            let spec = crate::start_once::spawn_spec(&state);
            let handle = match executor.spawn(spec).await {
                Ok(handle) => handle,
                Err(err) => {
                    let _ = published_tx.send(Err(std::io::Error::other(err.to_string())));
                    return;
                }
            };
            let handle = Arc::new(handle);
            state.set_child_pid(Some(handle.pid()));
            *current.lock() = Some(handle.clone());
            // §4.5 step 1: phase is `started` on publication, not left at
            // `awaitingReadiness` for the child's whole lifetime.
            state.set_phase(JobPhaseReason::Started, chrono::Utc::now());
            let _ = published_tx.send(Ok(()));

            let _ = run_remaining(&executor, &state, &handle, &attempt_cancel).await;
            *current.lock() = None;
            state.set_child_pid(None);
            state.set_phase(JobPhaseReason::AwaitingConnection, chrono::Utc::now());
        });

        drop(guard);

        published_rx
            .await
            .unwrap_or_else(|_| Err(std::io::Error::other("activation task dropped")))
    }
}

/// Waits out the rest of the child's lifetime after its handle has already
/// been published to waiting connections — mirrors the tail of
/// [`start_once`] without re-spawning.
async fn run_remaining<E: Executor>(
    executor: &E,
    state: &JobState,
    handle: &ignite_adapters::ChildHandle,
    cancel: &CancellationToken,
) -> ignite_core::Outcome {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = executor.signal_group(handle.pid(), ignite_adapters::GroupSignal::Term);
            let _ = executor.wait(handle).await;
            ignite_core::Outcome::CancelledByParent
        }
        wait_result = executor.wait(handle) => {
            match wait_result {
                Ok(outcome) if outcome.success => ignite_core::Outcome::ExitedOk,
                Ok(outcome) => ignite_core::Outcome::ExitedErr(outcome.code),
                Err(err) => {
                    tracing::error!(job = state.name(), error = %err, "error waiting for lazy job");
                    ignite_core::Outcome::ExitedErr(None)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_adapters::FakeExecutor;
    use ignite_core::JobKind;

    fn cfg() -> ignite_core::JobConfig {
        let json = r#"{"name": "lazy1", "command": "/bin/true", "listeners": [{"bindAddress": "127.0.0.1:0", "forwardAddress": "127.0.0.1:1"}], "laziness": {"spinUpTimeout": 1}}"#;
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn already_running_skips_activation() {
        let state = JobState::new(JobKind::classify(cfg()), chrono::Utc::now());
        state.set_child_pid(Some(123));
        let executor = FakeExecutor::new();
        let activator = LazyActivator::new(
            state,
            executor,
            Arc::new(Mutex::new(None)),
            CancellationToken::new(),
        );

        let result = activator.ensure_started().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cold_job_is_started_and_published() {
        let state = JobState::new(JobKind::classify(cfg()), chrono::Utc::now());
        let executor = FakeExecutor::new();
        let activator = LazyActivator::new(
            state,
            executor.clone(),
            Arc::new(Mutex::new(None)),
            CancellationToken::new(),
        );

        // The fake executor resolves `wait` the instant it's polled, so the
        // child may already have been reaped back to dormant by the time
        // this returns; what `ensure_started` actually promises is that the
        // spawn happened and was published before it returns.
        let result = activator.ensure_started().await;
        assert!(result.is_ok());
        assert_eq!(executor.calls().len(), 1);
    }
}
