// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn base(name: &str) -> BaseJobConfig {
    BaseJobConfig {
        name: name.to_string(),
        command: "/bin/true".to_string(),
        args: vec![],
        env: vec![],
        working_dir: None,
        can_fail: false,
        controllable: true,
        stdout_path: None,
        stderr_path: None,
        timestamp_format: None,
    }
}

fn job(max_attempts: i32) -> JobConfig {
    JobConfig {
        base: base("j1"),
        max_attempts,
        max_attempts_legacy: None,
        one_time: false,
        watches: vec![],
        listeners: vec![],
        laziness: None,
    }
}

#[parameterized(
    zero_normalizes_to_three = { 0, Some(3) },
    positive_is_used_as_is = { 7, Some(7) },
    negative_one_is_infinite = { -1, None },
    any_negative_is_infinite = { -42, None },
)]
fn effective_max_attempts(input: i32, expected: Option<u32>) {
    assert_eq!(job(input).effective_max_attempts(), expected);
}

#[test]
fn legacy_field_overrides_and_clears() {
    let mut cfg = job(3);
    cfg.max_attempts_legacy = Some(9);
    cfg.normalize_legacy_fields();
    assert_eq!(cfg.max_attempts, 9);
    assert!(cfg.max_attempts_legacy.is_none());
}

#[test]
fn lazy_eligible_requires_both_listener_and_laziness() {
    let mut cfg = job(3);
    assert!(!cfg.is_lazy_eligible());

    cfg.listeners.push(Listener {
        bind_address: "127.0.0.1:1".to_string(),
        listen_protocol: "tcp".to_string(),
        forward_address: "127.0.0.1:2".to_string(),
        forward_protocol: "tcp".to_string(),
    });
    assert!(!cfg.is_lazy_eligible());

    cfg.laziness = Some(Laziness {
        spin_up_timeout: None,
        cool_down_timeout: None,
    });
    assert!(cfg.is_lazy_eligible());
}

#[test]
fn deserializes_camel_case_config() {
    let json = r#"{
        "name": "web",
        "command": "serve",
        "canFail": true,
        "workingDirectory": "/srv",
        "maxAttempts": 5,
        "oneTime": false
    }"#;
    let cfg: JobConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.base.name, "web");
    assert!(cfg.base.can_fail);
    assert_eq!(cfg.base.working_dir.unwrap().to_str().unwrap(), "/srv");
    assert_eq!(cfg.max_attempts, 5);
}

#[test]
fn deserializes_legacy_snake_case_max_attempts() {
    let json = r#"{"name": "web", "command": "serve", "max_attempts": 9}"#;
    let mut cfg: JobConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.max_attempts_legacy, Some(9));
    cfg.normalize_legacy_fields();
    assert_eq!(cfg.max_attempts, 9);
}
