//! Black-box behavioral tests for `ignited`/`ignitectl` (§8 "TESTABLE
//! PROPERTIES" scenarios): each spawns the real daemon binary against a real
//! ignition document over a unix-socket control API and drives it with the
//! real CLI binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli_basics.rs"]
mod cli_basics;
#[path = "specs/crash_loop.rs"]
mod crash_loop;
#[path = "specs/lazy_activation.rs"]
mod lazy_activation;
#[path = "specs/one_time.rs"]
mod one_time;
#[path = "specs/stop_during_backoff.rs"]
mod stop_during_backoff;
#[path = "specs/watch_restart.rs"]
mod watch_restart;
