//! Scenario 4 (§8): touching a watched file sends the job's signal and, when
//! `restart: true`, the job comes back with a new PID rather than the old
//! process simply absorbing the signal.

use crate::prelude::*;
use std::time::Duration;

#[test]
fn touching_a_watched_file_restarts_the_job_with_a_new_pid() {
    let scratch = tempfile::tempdir().unwrap();
    let watched = scratch.path().join("reload.trigger");
    std::fs::write(&watched, b"v1").unwrap();

    let ignition = format!(
        r#"{{"jobs": [{{
            "name": "w1",
            "command": "sleep",
            "args": ["3600"],
            "watches": [{{"globPattern": "{}", "signal": 15, "restart": true}}]
        }}]}}"#,
        watched.to_str().unwrap().replace('\\', "\\\\")
    );

    let daemon = Daemon::start(&ignition);

    assert!(wait_for(2_000, || daemon.is_job_running("w1")));
    let first_pid = daemon.job_pid("w1").expect("job should report a pid once running");

    // Give the watcher's first poll tick a chance to seed its known-files
    // map before we make the change it's supposed to notice.
    std::thread::sleep(Duration::from_millis(200));
    std::fs::write(&watched, b"v2").unwrap();

    assert!(
        wait_for(12_000, || {
            daemon
                .job_pid("w1")
                .map(|pid| pid != first_pid)
                .unwrap_or(false)
        }),
        "job was never restarted with a new pid after the watched file changed"
    );
}
