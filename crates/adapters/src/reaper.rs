// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle reaper for lazy jobs (§4.5 "Reaper task"): periodically checks
//! whether a lazy job's connections have gone idle, sends SIGTERM, then
//! escalates to SIGKILL if the same process is still alive after a grace
//! period.

use crate::executor::{ChildHandle, Executor, GroupSignal};
use chrono::Utc;
use ignite_core::JobState;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_GRACE: Duration = Duration::from_secs(10);

/// Runs the reap ticker for one lazy job until `cancel` fires. `handle` is
/// re-read from `current` on every tick so a freshly-spawned child (after
/// reactivation) is observed rather than a stale one.
pub async fn run_reaper<E: Executor>(
    state: JobState,
    executor: E,
    current: Arc<dyn Fn() -> Option<Arc<ChildHandle>> + Send + Sync>,
    cancel: CancellationToken,
) {
    let cool_down = state
        .config()
        .laziness
        .as_ref()
        .map(|l| l.cool_down_timeout())
        .unwrap_or(Duration::from_secs(15 * 60));
    let tick_every = (cool_down / 2).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(tick_every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        if state.active_connections() > 0 {
            continue;
        }
        let idle_for = Utc::now() - state.last_connection_closed();
        if idle_for.num_milliseconds() < cool_down.as_millis() as i64 {
            continue;
        }
        if current().is_none() {
            continue;
        }

        let guard = state.lazy_start_lock().lock();
        // Re-check under the lock: a connection may have arrived, or the
        // child may have exited, between the unlocked checks above and now.
        if state.active_connections() > 0 {
            drop(guard);
            continue;
        }
        let idle_for = Utc::now() - state.last_connection_closed();
        if idle_for.num_milliseconds() < cool_down.as_millis() as i64 {
            drop(guard);
            continue;
        }
        let Some(handle) = current() else {
            drop(guard);
            continue;
        };

        let target_pid = handle.pid();
        let _ = executor.signal_group(target_pid, GroupSignal::Term);
        drop(guard);

        tokio::time::sleep(DEFAULT_GRACE).await;

        let still_same_pid = current().map(|h| h.pid()) == Some(target_pid);
        if still_same_pid {
            tracing::warn!(job = state.name(), pid = target_pid, "escalating to SIGKILL");
            let _ = executor.signal_group(target_pid, GroupSignal::Kill);
        }
    }
}
