//! Scenario 1 (§8): a job that keeps failing spawns exactly `maxAttempts`
//! times with an exponential backoff between attempts (2s, 4s, 8s), then
//! settles in the `failed` phase and is never respawned.

use crate::prelude::*;

#[test]
fn crash_loop_backs_off_and_then_fails() {
    let daemon = Daemon::start(
        r#"{"jobs": [{"name": "c1", "command": "/bin/false", "maxAttempts": 4, "canFail": false}]}"#,
    );

    assert!(
        wait_for(20_000, || {
            let out = daemon.ctl_output(&["job", "status", "c1"]);
            out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"failed\"")
        }),
        "job never settled into the failed phase"
    );

    // It stays failed — no auto-respawn once the retry budget is exhausted.
    std::thread::sleep(std::time::Duration::from_millis(500));
    assert!(!daemon.is_job_running("c1"));
    let out = daemon.ctl_output(&["job", "status", "c1"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("\"failed\""));
}

#[test]
fn can_fail_job_reaches_failed_phase_without_propagating_a_fatal_error() {
    let daemon = Daemon::start(
        r#"{"jobs": [{"name": "c2", "command": "/bin/false", "maxAttempts": 1, "canFail": true}]}"#,
    );

    assert!(wait_for(5_000, || {
        let out = daemon.ctl_output(&["job", "status", "c2"]);
        out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"failed\"")
    }));
}
