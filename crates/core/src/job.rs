// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job configuration (§3).

use crate::listener::{Laziness, Listener};
use crate::watch::Watch;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> i32 {
    3
}

/// Shared fields between `JobConfig` and `BootJobConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseJobConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default, rename = "workingDirectory")]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub can_fail: bool,
    #[serde(default = "default_true")]
    pub controllable: bool,
    #[serde(default)]
    pub stdout_path: Option<PathBuf>,
    #[serde(default)]
    pub stderr_path: Option<PathBuf>,
    #[serde(default)]
    pub timestamp_format: Option<crate::timestamp_format::TimestampFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    #[serde(flatten)]
    pub base: BaseJobConfig,
    #[serde(default = "default_max_attempts", rename = "maxAttempts")]
    pub max_attempts: i32,
    /// Legacy snake_case name (§6): if present, copied over `max_attempts`
    /// at ingestion time and a deprecation warning logged once. Kept as a
    /// distinct field (rather than a serde alias on `max_attempts` itself)
    /// so the "was this set?" check the ingestion code performs is possible.
    #[serde(default, rename = "max_attempts")]
    pub max_attempts_legacy: Option<i32>,
    #[serde(default)]
    pub one_time: bool,
    #[serde(default)]
    pub watches: Vec<Watch>,
    #[serde(default)]
    pub listeners: Vec<Listener>,
    #[serde(default)]
    pub laziness: Option<Laziness>,
}

impl JobConfig {
    /// Apply the legacy `max_attempts` alias, logging a one-time deprecation
    /// warning. Called once at ingestion (§6).
    pub fn normalize_legacy_fields(&mut self) {
        if let Some(legacy) = self.max_attempts_legacy.take() {
            tracing::warn!(
                job.name = %self.base.name,
                "config field `max_attempts` (snake_case) is deprecated, use `maxAttempts`"
            );
            self.max_attempts = legacy;
        }
    }

    /// §8/open-questions: 0 normalizes to the default of 3, negative means
    /// unbounded (represented as `None`), anything else is used as-is.
    pub fn effective_max_attempts(&self) -> Option<u32> {
        match self.max_attempts {
            i32::MIN..=-1 => None,
            0 => Some(3),
            n => Some(n as u32),
        }
    }

    pub fn is_lazy_eligible(&self) -> bool {
        !self.listeners.is_empty() && self.laziness.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootJobConfig {
    #[serde(flatten)]
    pub base: BaseJobConfig,
    #[serde(default, with = "duration_secs_opt")]
    pub timeout: Option<Duration>,
}

impl BootJobConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(Duration::from_secs(30))
    }
}

mod duration_secs_opt {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        v.map(|d| d.as_secs()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<u64> = Option::deserialize(d)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
