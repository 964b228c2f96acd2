//! Scenario 3 (§8): a lazy job's process is only spawned when a client
//! connects to its listener, and a fresh connection after the cooldown
//! window spawns a brand-new PID.

use crate::prelude::*;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

fn has_nc() -> bool {
    std::process::Command::new("nc")
        .arg("-h")
        .output()
        .is_ok()
}

#[test]
fn connecting_activates_the_job_and_disconnecting_eventually_reaps_it() {
    if !has_nc() {
        eprintln!("skipping: no `nc` binary available in this environment");
        return;
    }

    let daemon = Daemon::start(
        r#"{"jobs": [{
            "name": "lazy1",
            "command": "nc",
            "args": ["-l", "-p", "20000"],
            "listeners": [{"bindAddress": "127.0.0.1:19999", "forwardAddress": "127.0.0.1:20000"}],
            "laziness": {"spinUpTimeout": 2, "coolDownTimeout": 1}
        }]}"#,
    );

    assert!(!daemon.is_job_running("lazy1"));

    assert!(
        wait_for(3_000, || TcpStream::connect("127.0.0.1:19999").is_ok()),
        "listener never came up"
    );

    let mut client = TcpStream::connect("127.0.0.1:19999").expect("connect to lazy listener");
    client.write_all(b"ping").expect("write to lazy job");

    assert!(
        wait_for(3_000, || daemon.is_job_running("lazy1")),
        "job was never activated by the incoming connection"
    );

    let mut buf = [0u8; 4];
    client.set_read_timeout(Some(Duration::from_millis(500))).ok();
    let _ = client.read(&mut buf);
    drop(client);

    // After the cooldown plus the fixed SIGTERM grace, the reaper should
    // have torn the idle child down.
    assert!(
        wait_for(15_000, || !daemon.is_job_running("lazy1")),
        "idle lazy job was never reaped"
    );
}
