// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Runner (§4.7): owns every job and boot job for one supervisor
//! process, drives Init → Boot → Run → Shutdown, and (§4.6) exposes a
//! [`JobControl`] handle a control-API layer can drive concurrently.

use crate::error::RuntimeError;
use crate::lazy_activator::LazyActivator;
use crate::{boot_runner, restart_controller};
use ignite_adapters::{run_listener, run_reaper, Executor, GroupSignal, JobActivator};
use ignite_core::{Ignition, JobKind, JobPhaseReason, JobState, JobStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const WATCH_TICK: std::time::Duration = std::time::Duration::from_secs(5);

/// One supervised job. `activator` is only populated for lazy jobs, and is
/// the same activator the listener tasks forward connections through — the
/// control API's "start"/"restart" force an activation through the same
/// door a real connection would.
struct Managed {
    state: JobState,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), RuntimeError>>,
    activator: Option<Arc<dyn JobActivator>>,
}

type Registry = Arc<Mutex<HashMap<String, Managed>>>;

/// Supervises every job described by an [`Ignition`] document (§4.7).
/// Generic over the executor so tests can swap in a fake; production code
/// always instantiates this with [`ignite_adapters::TokioExecutor`].
pub struct Supervisor<E: Executor> {
    executor: E,
    ignition: Ignition,
    root_cancel: CancellationToken,
    keep_running: bool,
    registry: Registry,
}

impl<E: Executor> Supervisor<E> {
    pub fn new(executor: E, ignition: Ignition, root_cancel: CancellationToken) -> Self {
        Self {
            executor,
            ignition,
            root_cancel,
            keep_running: true,
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A cheap-to-clone handle the control API can drive independently of
    /// `run`'s own loop. Safe to call before `run` has spawned any jobs (it
    /// just reports nothing found yet, the same as after a job's task ends).
    pub fn control(&self) -> JobControl<E> {
        JobControl {
            executor: self.executor.clone(),
            registry: self.registry.clone(),
        }
    }

    /// Runs Boot then Run to completion (until `root_cancel` fires or, when
    /// `keep_running` is false, a fatal non-`can_fail` job error occurs).
    pub async fn run(self) -> Result<(), RuntimeError> {
        boot_runner::boot(&self.executor, &self.ignition.boot_jobs, &self.root_cancel).await?;

        for config in self.ignition.jobs.clone() {
            let kind = JobKind::classify(config);
            let (name, managed) = self.spawn_job(kind);
            self.registry.lock().insert(name, managed);
        }

        let mut ticker = tokio::time::interval(WATCH_TICK);
        ticker.tick().await; // first tick fires immediately; the 5s cadence starts after

        loop {
            tokio::select! {
                _ = self.root_cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.watch_tick().await;
                }
            }
        }

        self.root_cancel.cancel();
        let drained: Vec<Managed> = self.registry.lock().drain().map(|(_, v)| v).collect();
        for job in drained {
            let _ = job.task.await;
        }
        Ok(())
    }

    fn spawn_job(&self, kind: JobKind) -> (String, Managed) {
        let state = JobState::new(kind.clone(), chrono::Utc::now());
        let job_cancel = self.root_cancel.child_token();
        let name = state.name().to_string();

        // Seed before the first live tick so pre-existing files don't read
        // as "new" and fire a spurious signal/restart ~5s after start.
        {
            let mut known = state.watching_files();
            ignite_adapters::poll(&state.config().watches, &mut known, true);
        }

        let (task, activator) = match &kind {
            JobKind::Common(_) => (
                self.spawn_restart_controller(state.clone(), job_cancel.clone()),
                None,
            ),
            JobKind::Lazy(config) => {
                state.set_phase(JobPhaseReason::AwaitingConnection, chrono::Utc::now());

                let current: crate::lazy_activator::CurrentChild = Arc::new(Mutex::new(None));
                let activator = Arc::new(LazyActivator::new(
                    state.clone(),
                    self.executor.clone(),
                    current.clone(),
                    job_cancel.clone(),
                ));

                for listener_config in config.listeners.clone() {
                    let state = state.clone();
                    let activator: Arc<dyn JobActivator> = activator.clone();
                    let listener_cancel = job_cancel.child_token();
                    tokio::spawn(async move {
                        if let Err(err) =
                            run_listener(state, listener_config, activator, listener_cancel).await
                        {
                            tracing::error!(error = %err, "listener stopped with error");
                        }
                    });
                }

                let reaper_state = state.clone();
                let reaper_executor = self.executor.clone();
                let current_for_reaper = current.clone();
                tokio::spawn(run_reaper(
                    reaper_state,
                    reaper_executor,
                    Arc::new(move || current_for_reaper.lock().clone()),
                    job_cancel.child_token(),
                ));

                tracing::info!(job = state.name(), "holding off starting job until first request");
                let cancel_for_idle = job_cancel.clone();
                let task = tokio::spawn(async move {
                    cancel_for_idle.cancelled().await;
                    Ok(())
                });
                (task, Some(activator as Arc<dyn JobActivator>))
            }
        };

        (
            name,
            Managed {
                state,
                cancel: job_cancel,
                task,
                activator,
            },
        )
    }

    fn spawn_restart_controller(
        &self,
        state: JobState,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<(), RuntimeError>> {
        let executor = self.executor.clone();
        tokio::spawn(async move {
            restart_controller::run(&executor, &state, &cancel)
                .await
                .map_err(RuntimeError::from)
        })
    }

    /// One pass of §4.4 (per-job file watch) plus the re-add/restart check
    /// from §4.7 step 3.
    async fn watch_tick(&self) {
        let names: Vec<String> = self.registry.lock().keys().cloned().collect();
        for name in names {
            let needs_respawn = {
                let reg = self.registry.lock();
                let Some(job) = reg.get(&name) else { continue };
                if job.activator.is_some() {
                    continue;
                }
                // Completed/Stopped/Failed are all terminal decisions the
                // controller already made deliberately (one-time success,
                // an explicit stop, or exhausting the retry budget); only a
                // task that ended some other way (e.g. a panic) is re-added
                // here. This re-add is a safety net, not a second crash-loop
                // — the controller's own loop already owns that (§4.2).
                let phase = job.state.phase();
                let done = matches!(
                    phase.reason,
                    JobPhaseReason::Completed | JobPhaseReason::Stopped | JobPhaseReason::Failed
                );
                self.keep_running && !done && job.task.is_finished()
            };

            // Watches run outside the lock — they await a subprocess.
            if let Some(job_state) = self.registry.lock().get(&name).map(|j| j.state.clone()) {
                self.run_watches(&job_state).await;
            }

            if needs_respawn {
                self.respawn_common(&name).await;
            }
        }
    }

    async fn respawn_common(&self, name: &str) {
        let finished = self.registry.lock().remove(name);
        let Some(finished) = finished else { return };
        match finished.task.await {
            Ok(Err(err)) => tracing::warn!(job = %name, error = %err, "job task ended with error"),
            Err(join_err) => tracing::error!(job = %name, error = %join_err, "job task panicked"),
            Ok(Ok(())) => {}
        }
        tracing::warn!(job = %name, "common job task ended, restarting");
        let cancel = finished.cancel.child_token();
        let task = self.spawn_restart_controller(finished.state.clone(), cancel.clone());
        self.registry.lock().insert(
            name.to_string(),
            Managed {
                state: finished.state,
                cancel,
                task,
                activator: None,
            },
        );
    }

    async fn run_watches(&self, state: &JobState) {
        let config = state.config().clone();
        let triggered = {
            let mut known = state.watching_files();
            ignite_adapters::poll(&config.watches, &mut known, false).triggered
        };

        for index in triggered {
            let Some(watch) = config.watches.get(index) else {
                continue;
            };

            if let Some(pre) = &watch.pre_command {
                run_watch_command(state, pre, "pre_command").await;
            }
            if watch.restart {
                state.set_restart_flag();
            }
            if let Some(pid) = state.child_pid() {
                let _ = self.executor.signal_group(pid, signal_from_raw(watch.signal));
            }
            if let Some(post) = &watch.post_command {
                run_watch_command(state, post, "post_command").await;
            }
        }
    }
}

/// Result of a control-API action against a named job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    NotFound,
    Ok,
}

/// §4.6 control-API surface, decoupled from any particular HTTP framework.
/// Cheap to clone; every clone shares the same underlying registry.
pub struct JobControl<E: Executor> {
    executor: E,
    registry: Registry,
}

impl<E: Executor> Clone for JobControl<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<E: Executor> JobControl<E> {
    /// Names of every controllable job currently known to the supervisor.
    pub fn list(&self) -> Vec<String> {
        self.registry
            .lock()
            .values()
            .filter(|m| m.state.config().base.controllable)
            .map(|m| m.state.name().to_string())
            .collect()
    }

    pub fn status(&self, name: &str) -> Option<JobStatus> {
        let reg = self.registry.lock();
        let managed = reg.get(name)?;
        if !managed.state.config().base.controllable {
            return None;
        }
        Some(managed.state.status())
    }

    /// "If not running, invoke restart controller" (§4.6). For a lazy job,
    /// forces activation through the same door a connection would.
    pub async fn start(&self, name: &str) -> ControlOutcome {
        let action = {
            let mut reg = self.registry.lock();
            let Some(managed) = reg.get(name) else {
                return ControlOutcome::NotFound;
            };
            if !managed.state.config().base.controllable {
                return ControlOutcome::NotFound;
            }
            if let Some(activator) = &managed.activator {
                StartAction::Activate(activator.clone())
            } else if managed.task.is_finished() {
                let Some(m) = reg.remove(name) else {
                    return ControlOutcome::NotFound;
                };
                StartAction::Respawn(m)
            } else {
                StartAction::AlreadyRunning
            }
        };

        match action {
            StartAction::AlreadyRunning => ControlOutcome::Ok,
            StartAction::Activate(activator) => {
                if let Err(err) = activator.ensure_started().await {
                    tracing::warn!(job = name, error = %err, "start request failed to activate job");
                }
                ControlOutcome::Ok
            }
            StartAction::Respawn(finished) => {
                finished.state.reset_stop_flag();
                let cancel = finished.cancel.child_token();
                let task = self.spawn_controller(finished.state.clone(), cancel.clone());
                self.registry.lock().insert(
                    name.to_string(),
                    Managed {
                        state: finished.state,
                        cancel,
                        task,
                        activator: None,
                    },
                );
                ControlOutcome::Ok
            }
        }
    }

    /// "If running, set `restart_flag` and interrupt current attempt; else
    /// start" (§4.6).
    pub async fn restart(&self, name: &str) -> ControlOutcome {
        let found = {
            let reg = self.registry.lock();
            match reg.get(name) {
                None => return ControlOutcome::NotFound,
                Some(managed) if !managed.state.config().base.controllable => {
                    return ControlOutcome::NotFound
                }
                Some(managed) => (managed.state.clone(), managed.activator.clone()),
            }
        };
        let (state, activator) = found;

        if let Some(pid) = state.child_pid() {
            state.set_restart_flag();
            let _ = self.executor.signal_group(pid, GroupSignal::Term);
            if let Some(activator) = activator {
                // Lazy jobs don't re-check `restart_flag`; the SIGTERM above
                // returns them to dormant, so re-activate directly.
                if let Err(err) = activator.ensure_started().await {
                    tracing::warn!(job = name, error = %err, "restart request failed to reactivate job");
                }
            }
            ControlOutcome::Ok
        } else {
            self.start(name).await
        }
    }

    /// "Set `stop_flag`, send SIGTERM to group, interrupt current attempt"
    /// (§4.6).
    pub async fn stop(&self, name: &str) -> ControlOutcome {
        let state = {
            let reg = self.registry.lock();
            match reg.get(name) {
                None => return ControlOutcome::NotFound,
                Some(managed) if !managed.state.config().base.controllable => {
                    return ControlOutcome::NotFound
                }
                Some(managed) => managed.state.clone(),
            }
        };

        state.set_stop_flag();
        if let Some(pid) = state.child_pid() {
            let _ = self.executor.signal_group(pid, GroupSignal::Term);
        }
        ControlOutcome::Ok
    }

    fn spawn_controller(
        &self,
        state: JobState,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<(), RuntimeError>> {
        let executor = self.executor.clone();
        tokio::spawn(async move {
            restart_controller::run(&executor, &state, &cancel)
                .await
                .map_err(RuntimeError::from)
        })
    }
}

enum StartAction {
    AlreadyRunning,
    Activate(Arc<dyn JobActivator>),
    Respawn(Managed),
}

fn signal_from_raw(signal: i32) -> GroupSignal {
    match signal {
        15 => GroupSignal::Term,
        9 => GroupSignal::Kill,
        n => GroupSignal::Custom(n),
    }
}

async fn run_watch_command(state: &JobState, command: &ignite_core::WatchCommand, which: &str) {
    let mut cmd = tokio::process::Command::new(&command.command);
    cmd.args(&command.args);
    for entry in &command.env {
        if let Some((key, value)) = entry.split_once('=') {
            cmd.env(key, value);
        }
    }

    match cmd.status().await {
        Ok(status) if status.success() => {}
        Ok(status) => {
            tracing::warn!(job = state.name(), which, code = ?status.code(), "watch command exited non-zero");
        }
        Err(err) => {
            tracing::warn!(job = state.name(), which, error = %err, "failed to run watch command");
        }
    }
}
