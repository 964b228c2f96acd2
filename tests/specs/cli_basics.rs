//! `ignited --help`/`--version`, `ignitectl --help`, and basic error paths
//! that don't require a running daemon.

use crate::prelude::*;

#[test]
fn ignited_version_flag_prints_a_version_and_exits_zero() {
    let output = std::process::Command::new(ignited_path())
        .arg("--version")
        .output()
        .expect("ignited runs");
    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}

#[test]
fn ignited_help_flag_prints_usage_and_exits_zero() {
    let output = std::process::Command::new(ignited_path())
        .arg("--help")
        .output()
        .expect("ignited runs");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--bind"));
}

#[test]
fn ignited_without_a_bind_address_fails_with_a_clear_error() {
    let output = std::process::Command::new(ignited_path())
        .arg("some-ignition.json")
        .output()
        .expect("ignited runs");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--bind"));
}

#[test]
fn ignitectl_help_flag_prints_usage_and_exits_zero() {
    let output = std::process::Command::new(ignitectl_path())
        .arg("--help")
        .output()
        .expect("ignitectl runs");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--api"));
}

#[test]
fn ignitectl_status_of_unknown_job_reports_http_404() {
    let daemon = Daemon::start(r#"{"jobs": [{"name": "a", "command": "/bin/true"}]}"#);
    let output = daemon.ctl_output(&["job", "status", "does-not-exist"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("404"), "expected a 404, got: {stderr}");
}

#[test]
fn ignitectl_jobs_lists_every_controllable_job() {
    let daemon = Daemon::start(
        r#"{"jobs": [{"name": "a", "command": "/bin/true"}, {"name": "b", "command": "/bin/true", "controllable": false}]}"#,
    );
    assert!(wait_for(2_000, || {
        let out = daemon.ctl_output(&["jobs"]);
        out.status.success() && String::from_utf8_lossy(&out.stdout).contains("\"a\"")
    }));
    let out = daemon.ctl_output(&["jobs"]);
    let body = String::from_utf8_lossy(&out.stdout);
    assert!(!body.contains("\"b\""), "uncontrollable job should be omitted: {body}");
}
