//! Test helpers for behavioral specifications.
//!
//! Black-box harness that spawns the real `ignited` daemon against a real
//! ignition document and drives it with the real `ignitectl` binary, the
//! same black-box convention the pack's `tests/specs/prelude.rs` uses.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

pub const POLL_INTERVAL_MS: u64 = 20;
pub const READY_TIMEOUT_MS: u64 = 3000;

fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn ignited_binary() -> PathBuf {
    binary_path("ignited")
}

fn ignitectl_binary() -> PathBuf {
    binary_path("ignitectl")
}

pub fn ignited_path() -> PathBuf {
    ignited_binary()
}

pub fn ignitectl_path() -> PathBuf {
    ignitectl_binary()
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
    false
}

/// A running `ignited` process bound to a unix socket inside a scratch
/// directory, supervising the jobs described by `ignition_json`.
pub struct Daemon {
    child: Child,
    socket: PathBuf,
    _scratch: tempfile::TempDir,
}

impl Daemon {
    pub fn start(ignition_json: &str) -> Self {
        let scratch = tempfile::tempdir().expect("tempdir");
        let ignition_path = scratch.path().join("ignition.json");
        std::fs::write(&ignition_path, ignition_json).expect("write ignition");
        let socket = scratch.path().join("api.sock");

        let child = Command::new(ignited_binary())
            .arg("--bind")
            .arg(format!("unix:{}", socket.display()))
            .arg(&ignition_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("ignited should spawn");

        let daemon = Daemon {
            child,
            socket,
            _scratch: scratch,
        };
        assert!(
            wait_for(READY_TIMEOUT_MS, || daemon.socket.exists()),
            "ignited never created its control socket"
        );
        daemon
    }

    pub fn api(&self) -> String {
        format!("unix:{}", self.socket.display())
    }

    pub fn ctl(&self) -> Command {
        let mut cmd = Command::new(ignitectl_binary());
        cmd.arg("--api").arg(self.api());
        cmd
    }

    pub fn ctl_output(&self, args: &[&str]) -> Output {
        self.ctl().args(args).output().expect("ignitectl runs")
    }

    pub fn is_job_running(&self, name: &str) -> bool {
        let output = self.ctl_output(&["job", "status", name]);
        output.status.success()
            && String::from_utf8_lossy(&output.stdout).contains("\"running\":true")
    }

    /// The job's current child pid, parsed out of `job status`'s JSON body.
    /// Returns `None` if the job isn't running or the call fails.
    pub fn job_pid(&self, name: &str) -> Option<u32> {
        let output = self.ctl_output(&["job", "status", name]);
        if !output.status.success() {
            return None;
        }
        let body: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        body.get("pid")?.as_u64().map(|pid| pid as u32)
    }

    pub fn stdout_lines(&mut self) -> Vec<String> {
        if let Some(stdout) = self.child.stdout.take() {
            BufReader::new(stdout).lines().map_while(Result::ok).collect()
        } else {
            Vec::new()
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
