// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake executor for testing the restart controller and lazy activator
//! without forking real processes.

use super::{ChildHandle, ChildHandleInner, Executor, ExitOutcome, GroupSignal, SpawnSpec};
use async_trait::async_trait;
use ignite_core::SpawnError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub enum ExecutorCall {
    Spawn(SpawnSpec),
    Signal { pid: u32, signal: GroupSignal },
}

struct FakeChildState {
    outcome: Option<std::io::Result<ExitOutcome>>,
    signals_received: Vec<GroupSignal>,
}

/// Shared handle a test holds to drive a fake child's lifecycle from the
/// outside (e.g. "the job exits with code 1 now").
pub(crate) struct FakeChild {
    state: Arc<Mutex<FakeChildState>>,
    notify: Arc<Notify>,
}

impl FakeChild {
    pub(crate) async fn wait(&self) -> std::io::Result<ExitOutcome> {
        loop {
            if let Some(outcome) = self.state.lock().outcome.take() {
                return outcome;
            }
            self.notify.notified().await;
        }
    }
}

#[derive(Default)]
struct Inner {
    next_pid: AtomicU32,
    calls: Mutex<Vec<ExecutorCall>>,
    children: Mutex<HashMap<u32, (Arc<Mutex<FakeChildState>>, Arc<Notify>)>>,
    /// Outcome queued for the *next* spawn, by job name. Defaults to a
    /// successful exit if unset.
    next_outcomes: Mutex<HashMap<String, ExitOutcome>>,
}

/// In-memory stand-in for [`Executor`]. Every spawned job exits successfully
/// by default; call [`FakeExecutor::queue_outcome`] before spawning to make a
/// specific job crash, and [`FakeExecutor::finish`] to resolve it once
/// spawned.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    inner: Arc<Inner>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.inner.calls.lock().clone()
    }

    /// Queue the outcome the next spawn of `job_name` should eventually
    /// resolve to once [`finish`](Self::finish) is called for its pid.
    pub fn queue_outcome(&self, job_name: &str, outcome: ExitOutcome) {
        self.inner
            .next_outcomes
            .lock()
            .insert(job_name.to_string(), outcome);
    }

    /// Resolve the given pid's `wait()` future with its queued (or default
    /// success) outcome.
    pub fn finish(&self, pid: u32, outcome: ExitOutcome) {
        let children = self.inner.children.lock();
        if let Some((state, notify)) = children.get(&pid) {
            state.lock().outcome = Some(Ok(outcome));
            notify.notify_waiters();
        }
    }

    pub fn signals_received(&self, pid: u32) -> Vec<GroupSignal> {
        self.inner
            .children
            .lock()
            .get(&pid)
            .map(|(state, _)| state.lock().signals_received.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn spawn(&self, spec: SpawnSpec) -> Result<ChildHandle, SpawnError> {
        let pid = self.inner.next_pid.fetch_add(1, Ordering::SeqCst) + 1;
        let default_outcome = self
            .inner
            .next_outcomes
            .lock()
            .remove(&spec.job_name)
            .unwrap_or(ExitOutcome {
                success: true,
                code: Some(0),
            });

        let state = Arc::new(Mutex::new(FakeChildState {
            outcome: None,
            signals_received: Vec::new(),
        }));
        let notify = Arc::new(Notify::new());
        self.inner
            .children
            .lock()
            .insert(pid, (state.clone(), notify.clone()));
        self.inner.calls.lock().push(ExecutorCall::Spawn(spec));

        // Tests that don't care about exact timing can just let the fake
        // resolve immediately with the queued/default outcome.
        self.finish(pid, default_outcome);

        Ok(ChildHandle {
            pid,
            inner: ChildHandleInner::Fake(FakeChild { state, notify }),
        })
    }

    async fn wait(&self, handle: &ChildHandle) -> std::io::Result<ExitOutcome> {
        match &handle.inner {
            ChildHandleInner::Fake(fake) => fake.wait().await,
            ChildHandleInner::Real(_) => unreachable!("FakeExecutor only produces fake handles"),
        }
    }

    fn signal_group(&self, pid: u32, signal: GroupSignal) -> std::io::Result<()> {
        self.inner.calls.lock().push(ExecutorCall::Signal { pid, signal });
        if let Some((state, _)) = self.inner.children.lock().get(&pid) {
            state.lock().signals_received.push(signal);
        }
        Ok(())
    }
}
