// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fully-parsed config bundle the supervisor is handed (§3, SPEC_FULL
//! §10.3). Discovery/parsing of this value is a collaborator's job; here it
//! is just a `Deserialize` target.

use crate::job::{BootJobConfig, JobConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A health/readiness probe definition. Execution belongs to a collaborator;
/// the supervisor only needs to carry the value through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub name: String,
    #[serde(flatten)]
    pub body: Value,
}

/// A file the upstream discovery tool wants materialized before boot jobs
/// run. Rendering is out of scope here; kept opaque for the same reason as
/// `Probe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    pub path: String,
    #[serde(flatten)]
    pub body: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ignition {
    #[serde(default)]
    pub probes: Vec<Probe>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    #[serde(default)]
    pub boot_jobs: Vec<BootJobConfig>,
}

impl Ignition {
    /// Applies the legacy `max_attempts` alias across every job, logging a
    /// deprecation warning for each one that used it (§6).
    pub fn normalize(&mut self) {
        for job in &mut self.jobs {
            job.normalize_legacy_fields();
        }
    }
}
