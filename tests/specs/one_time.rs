//! Scenario 2 (§8): a one-time job runs exactly once and is reported as
//! completed, never respawned by `keep_running`.

use crate::prelude::*;

#[test]
fn one_time_job_completes_and_is_not_restarted() {
    let daemon = Daemon::start(
        r#"{"jobs": [{"name": "init1", "command": "/bin/true", "oneTime": true}]}"#,
    );

    assert!(
        wait_for(2000, || {
            let out = daemon.ctl_output(&["job", "status", "init1"]);
            out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"completed\"")
        }),
        "job never reached the completed phase"
    );

    assert!(!daemon.is_job_running("init1"));

    std::thread::sleep(std::time::Duration::from_millis(500));
    let out = daemon.ctl_output(&["job", "status", "init1"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("\"completed\""));
}
