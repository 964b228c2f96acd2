// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status snapshot returned by the control API's `GET /v1/job/{name}/status`
//! (§4.6).

use crate::job::JobConfig;
use crate::phase::JobPhase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub running: bool,
    pub phase: JobPhase,
    pub config: JobConfig,
}

impl crate::job_state::JobState {
    pub fn status(&self) -> JobStatus {
        JobStatus {
            pid: self.child_pid(),
            running: self.is_running(),
            phase: self.phase(),
            config: self.config().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_state::{JobKind, JobState};
    use chrono::Utc;

    #[test]
    fn status_reflects_child_pid_and_phase() {
        let cfg: JobConfig =
            serde_json::from_str(r#"{"name": "a", "command": "/bin/true"}"#).unwrap();
        let state = JobState::new(JobKind::classify(cfg), Utc::now());
        state.set_child_pid(Some(123));

        let status = state.status();
        assert_eq!(status.pid, Some(123));
        assert!(status.running);
        assert_eq!(status.config.base.name, "a");
    }
}
