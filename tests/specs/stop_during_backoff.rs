//! Scenario 5 (§8): stopping a job while it is sleeping between crash-loop
//! attempts interrupts the sleep promptly instead of waiting out the
//! remaining backoff.

use crate::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn stop_interrupts_crash_loop_backoff_promptly() {
    let daemon = Daemon::start(
        r#"{"jobs": [{"name": "c2", "command": "/bin/false", "maxAttempts": 10, "canFail": false}]}"#,
    );

    // Let the job fail once and enter its first backoff sleep (2s).
    assert!(wait_for(2_000, || {
        let out = daemon.ctl_output(&["job", "status", "c2"]);
        out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"crashLooping\"")
    }));

    let stop_started = Instant::now();
    let stop_output = daemon.ctl_output(&["job", "stop", "c2"]);
    assert!(stop_output.status.success());

    assert!(
        wait_for(1_000, || {
            let out = daemon.ctl_output(&["job", "status", "c2"]);
            out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"stopped\"")
        }),
        "job did not reach the stopped phase promptly"
    );
    assert!(
        stop_started.elapsed() < Duration::from_secs(2),
        "stop took as long as a full backoff interval, the sleep was not interrupted"
    );
}
