// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process executor (§4.1): spawn a job's command in its own process group,
//! wait for it to exit, and signal the whole group for shutdown/restart.

mod stdio;
mod tokio_executor;

pub use stdio::{resolve_stdio, StdioPlan};
pub use tokio_executor::TokioExecutor;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ExecutorCall, FakeExecutor};

use async_trait::async_trait;
use ignite_core::SpawnError;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Everything the executor needs to fork a job's command (§3 `Job`/`BootJob`
/// shared fields).
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub job_name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub stdout_path: Option<PathBuf>,
    pub stderr_path: Option<PathBuf>,
    pub timestamp_format: Option<ignite_core::TimestampFormat>,
}

/// Handle to a spawned child. Opaque outside this crate; `wait`/`signal_group`
/// are the only ways to interact with it.
pub struct ChildHandle {
    pub(crate) pid: u32,
    pub(crate) inner: ChildHandleInner,
}

pub(crate) enum ChildHandleInner {
    Real(tokio::sync::Mutex<tokio::process::Child>),
    #[cfg(any(test, feature = "test-support"))]
    Fake(fake::FakeChild),
}

impl ChildHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// How a spawned process terminated, normalized across real and faked
/// executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub success: bool,
    pub code: Option<i32>,
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Process-group signal to deliver on shutdown/restart (§4.1, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSignal {
    Term,
    Kill,
    Custom(i32),
}

#[async_trait]
pub trait Executor: Clone + Send + Sync + 'static {
    /// Fork `spec.command` in a new process group, redirecting stdio per
    /// `stdout_path`/`stderr_path` (§3).
    async fn spawn(&self, spec: SpawnSpec) -> Result<ChildHandle, SpawnError>;

    /// Block until the child exits.
    async fn wait(&self, handle: &ChildHandle) -> std::io::Result<ExitOutcome>;

    /// Best-effort signal to a process group, addressed by the leader's
    /// pid rather than a live [`ChildHandle`] so callers that only track a
    /// pid (the watcher, the status API) can still signal it. "No such
    /// process" is not an error (§4.2 step 5).
    fn signal_group(&self, pid: u32, signal: GroupSignal) -> std::io::Result<()>;
}
