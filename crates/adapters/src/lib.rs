// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! I/O adapters: process execution, file watching, and the lazy-activation
//! proxy/reaper.

pub mod executor;
pub mod proxy;
pub mod reaper;
pub mod watcher;

pub use executor::{ChildHandle, Executor, ExitOutcome, GroupSignal, SpawnSpec, TokioExecutor};
pub use proxy::{run_listener, JobActivator};
pub use reaper::run_reaper;
pub use watcher::{poll, WatchPoll};

#[cfg(any(test, feature = "test-support"))]
pub use executor::{ExecutorCall, FakeExecutor};
