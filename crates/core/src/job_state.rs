// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared mutable runtime state for one job (§3 Runtime fields, §5).
//!
//! This is the data the restart controller, the file watcher, and the lazy
//! proxy all reach into concurrently; it owns no behavior itself. Common and
//! Lazy jobs share this shape and diverge only in which collaborator drives
//! `Run` — modeled here as `JobKind`, a sum type dispatched on by the
//! supervisor loop rather than open-world polymorphism (§9 design note).

use crate::job::{BootJobConfig, JobConfig};
use crate::phase::{JobPhase, JobPhaseReason};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Notify;

/// Which controller drives this job's `Run` loop (§9).
#[derive(Debug, Clone)]
pub enum JobKind {
    Common(JobConfig),
    Lazy(JobConfig),
}

impl JobKind {
    pub fn config(&self) -> &JobConfig {
        match self {
            JobKind::Common(c) | JobKind::Lazy(c) => c,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, JobKind::Lazy(_))
    }

    /// Classify a job config per §3/§4.5: lazy iff it carries both a
    /// listener and a laziness block.
    pub fn classify(config: JobConfig) -> Self {
        if config.is_lazy_eligible() {
            JobKind::Lazy(config)
        } else {
            JobKind::Common(config)
        }
    }
}

/// The handle the supervisor, API, and proxy tasks all share for a single
/// running job. Cheap to clone (`Arc` internally).
#[derive(Debug, Clone)]
pub struct JobState(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    name: String,
    kind: JobKind,
    phase: Mutex<JobPhase>,
    restart_flag: AtomicBool,
    stop_flag: AtomicBool,
    watching_files: Mutex<HashMap<PathBuf, SystemTime>>,
    last_connection_closed: Mutex<DateTime<Utc>>,
    active_connections: AtomicI64,
    child_pid: Mutex<Option<u32>>,
    lazy_start_lock: Mutex<()>,
    interrupt: Notify,
}

impl JobState {
    pub fn new(kind: JobKind, now: DateTime<Utc>) -> Self {
        let name = kind.config().base.name.clone();
        Self(Arc::new(Inner {
            name,
            kind,
            phase: Mutex::new(JobPhase::new(JobPhaseReason::AwaitingReadiness, now)),
            restart_flag: AtomicBool::new(false),
            stop_flag: AtomicBool::new(false),
            watching_files: Mutex::new(HashMap::new()),
            last_connection_closed: Mutex::new(now),
            active_connections: AtomicI64::new(0),
            child_pid: Mutex::new(None),
            lazy_start_lock: Mutex::new(()),
            interrupt: Notify::new(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> &JobKind {
        &self.0.kind
    }

    pub fn config(&self) -> &JobConfig {
        self.0.kind.config()
    }

    pub fn phase(&self) -> JobPhase {
        self.0.phase.lock().clone()
    }

    pub fn set_phase(&self, reason: JobPhaseReason, now: DateTime<Utc>) {
        self.0.phase.lock().set(reason, now);
    }

    /// §4.2 step 5: "clear it, return `RestartRequested`".
    pub fn take_restart_flag(&self) -> bool {
        self.0.restart_flag.swap(false, Ordering::SeqCst)
    }

    pub fn set_restart_flag(&self) {
        self.0.restart_flag.store(true, Ordering::SeqCst);
        self.0.interrupt.notify_waiters();
    }

    pub fn stop_requested(&self) -> bool {
        self.0.stop_flag.load(Ordering::SeqCst)
    }

    pub fn set_stop_flag(&self) {
        self.0.stop_flag.store(true, Ordering::SeqCst);
        self.0.interrupt.notify_waiters();
    }

    /// Resolves as soon as `set_stop_flag`/`set_restart_flag` is next
    /// called. Lets the crash-loop backoff sleep (§4.2) wake up early when
    /// there's no live child to signal instead (§5 timeouts: a stop must
    /// interrupt within ~100ms even mid-backoff).
    pub async fn interrupted(&self) {
        self.0.interrupt.notified().await;
    }

    /// §3 invariant 5: monotonic within one Run cycle; `Reset` clears it
    /// before re-run.
    pub fn reset_stop_flag(&self) {
        self.0.stop_flag.store(false, Ordering::SeqCst);
    }

    pub fn watching_files(&self) -> parking_lot::MutexGuard<'_, HashMap<PathBuf, SystemTime>> {
        self.0.watching_files.lock()
    }

    pub fn last_connection_closed(&self) -> DateTime<Utc> {
        *self.0.last_connection_closed.lock()
    }

    pub fn mark_connection_closed(&self, now: DateTime<Utc>) {
        *self.0.last_connection_closed.lock() = now;
    }

    /// §8 property 3: pairs with `decrement_connections`, never negative.
    pub fn increment_connections(&self) {
        self.0.active_connections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_connections(&self) {
        self.0.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active_connections(&self) -> i64 {
        self.0.active_connections.load(Ordering::SeqCst)
    }

    pub fn child_pid(&self) -> Option<u32> {
        *self.0.child_pid.lock()
    }

    pub fn set_child_pid(&self, pid: Option<u32>) {
        *self.0.child_pid.lock() = pid;
    }

    pub fn is_running(&self) -> bool {
        self.child_pid().is_some()
    }

    /// Guards the cold-start double-check and reap-escalation paths (§9).
    pub fn lazy_start_lock(&self) -> &Mutex<()> {
        &self.0.lazy_start_lock
    }
}

/// Boot jobs have no restart/lazy state; they run once to completion or
/// timeout (§4.3) and are dropped from the supervisor's view afterward.
#[derive(Debug, Clone)]
pub struct BootJobState {
    pub config: BootJobConfig,
}

impl BootJobState {
    pub fn new(config: BootJobConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        &self.config.base.name
    }
}
