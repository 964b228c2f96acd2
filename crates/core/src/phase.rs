// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coarse job lifecycle phase reported by the status API (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobPhaseReason {
    AwaitingReadiness,
    AwaitingConnection,
    Started,
    Stopped,
    Completed,
    Failed,
    CrashLooping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPhase {
    pub reason: JobPhaseReason,
    pub last_change: DateTime<Utc>,
}

impl JobPhase {
    pub fn new(reason: JobPhaseReason, now: DateTime<Utc>) -> Self {
        Self {
            reason,
            last_change: now,
        }
    }

    /// Set a new reason. A no-op (timestamp unchanged) if `reason` is
    /// already current — invariant from §3's `JobPhase` description.
    pub fn set(&mut self, reason: JobPhaseReason, now: DateTime<Utc>) {
        if self.reason == reason {
            return;
        }
        self.reason = reason;
        self.last_change = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn setting_same_reason_is_a_no_op() {
        let t0 = Utc::now();
        let mut phase = JobPhase::new(JobPhaseReason::Started, t0);
        let t1 = t0 + Duration::seconds(5);
        phase.set(JobPhaseReason::Started, t1);
        assert_eq!(phase.last_change, t0);
    }

    #[test]
    fn setting_new_reason_updates_timestamp() {
        let t0 = Utc::now();
        let mut phase = JobPhase::new(JobPhaseReason::Started, t0);
        let t1 = t0 + Duration::seconds(5);
        phase.set(JobPhaseReason::CrashLooping, t1);
        assert_eq!(phase.reason, JobPhaseReason::CrashLooping);
        assert_eq!(phase.last_change, t1);
    }
}
