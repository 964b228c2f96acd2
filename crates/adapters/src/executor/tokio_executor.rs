// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real `Executor` backed by `tokio::process::Command`.

use super::{ChildHandle, ChildHandleInner, Executor, ExitOutcome, GroupSignal, SpawnSpec, StdioPlan};
use async_trait::async_trait;
use ignite_core::SpawnError;
use std::io::Write;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

impl TokioExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for TokioExecutor {
    async fn spawn(&self, spec: SpawnSpec) -> Result<ChildHandle, SpawnError> {
        let prefixed = spec.timestamp_format.is_some();
        let (stdout_plan, stderr_plan) = super::resolve_stdio(
            spec.stdout_path.as_deref(),
            spec.stderr_path.as_deref(),
            prefixed,
        )
        .map_err(|source| SpawnError::Stdio {
            job: spec.job_name.clone(),
            path: display_path(spec.stdout_path.as_deref()),
            source,
        })?;

        let (stdout_stdio, stdout_sink) = into_child_stdio(stdout_plan);
        let (stderr_stdio, stderr_sink) = into_child_stdio(stderr_plan);

        let mut cmd = Command::new(&spec.command);
        cmd.stdout(stdout_stdio).stderr(stderr_stdio).args(&spec.args);

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        for entry in &spec.env {
            if let Some((key, value)) = entry.split_once('=') {
                cmd.env(key, value);
            }
        }

        // New process group so a group signal reaches every descendant, not
        // just the immediate child (§4.2 step 5).
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| SpawnError::Fork {
            job: spec.job_name.clone(),
            source,
        })?;

        let pid = child.id().ok_or_else(|| SpawnError::Fork {
            job: spec.job_name.clone(),
            source: std::io::Error::other("child exited before pid could be read"),
        })?;

        if let Some(sink) = stdout_sink {
            if let Some(pipe) = child.stdout.take() {
                spawn_prefix_forwarder(spec.job_name.clone(), pipe, sink, spec.timestamp_format.clone());
            }
        }
        if let Some(sink) = stderr_sink {
            if let Some(pipe) = child.stderr.take() {
                spawn_prefix_forwarder(spec.job_name.clone(), pipe, sink, spec.timestamp_format.clone());
            }
        }

        Ok(ChildHandle {
            pid,
            inner: ChildHandleInner::Real(tokio::sync::Mutex::new(child)),
        })
    }

    async fn wait(&self, handle: &ChildHandle) -> std::io::Result<ExitOutcome> {
        match &handle.inner {
            ChildHandleInner::Real(child) => {
                let status = child.lock().await.wait().await?;
                Ok(ExitOutcome::from(status))
            }
            #[cfg(any(test, feature = "test-support"))]
            ChildHandleInner::Fake(fake) => fake.wait().await,
        }
    }

    fn signal_group(&self, pid: u32, signal: GroupSignal) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            let sig = match signal {
                GroupSignal::Term => Signal::SIGTERM,
                GroupSignal::Kill => Signal::SIGKILL,
                GroupSignal::Custom(n) => {
                    Signal::try_from(n).map_err(|_| std::io::Error::other("invalid signal"))?
                }
            };

            // Negative pid targets the whole process group.
            match signal::kill(Pid::from_raw(-(pid as i32)), sig) {
                Ok(()) => Ok(()),
                Err(nix::errno::Errno::ESRCH) => Ok(()), // no such process: already gone
                Err(errno) => Err(std::io::Error::from(errno)),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = (pid, signal);
            Err(std::io::Error::other("process groups are unix-only"))
        }
    }
}

fn display_path(path: Option<&std::path::Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<inherited>".to_string())
}

/// Splits a [`StdioPlan`] into what `Command` needs (a `Stdio`) and, for a
/// prefixed plan, the destination a forwarder task should write timestamped
/// lines into once the child is spawned.
fn into_child_stdio(plan: StdioPlan) -> (Stdio, Option<Box<dyn Write + Send>>) {
    match plan {
        StdioPlan::Direct(stdio) => (stdio, None),
        StdioPlan::Prefixed(sink) => (Stdio::piped(), Some(sink)),
    }
}

/// Reads `pipe` line by line, prefixing each with `[<formatted now>]` before
/// writing it to `sink` (§4.1 step 2). Write failures are logged, not
/// propagated, matching the daemon's general logging posture: losing a line
/// of job output must never take the job down with it.
fn spawn_prefix_forwarder<R>(
    job_name: String,
    pipe: R,
    mut sink: Box<dyn Write + Send>,
    timestamp_format: Option<ignite_core::TimestampFormat>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(timestamp_format) = timestamp_format else {
        return;
    };
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let stamp = timestamp_format.format(chrono::Utc::now());
                    if let Err(err) = writeln!(sink, "[{stamp}] {line}") {
                        tracing::warn!(job = job_name, error = %err, "failed to write job output line");
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(job = job_name, error = %err, "error reading job output pipe");
                    break;
                }
            }
        }
    });
}
