// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy-activation listener/proxy config (§3 `Listener`, `Laziness`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_protocol() -> String {
    "tcp".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub bind_address: String,
    #[serde(default = "default_protocol")]
    pub listen_protocol: String,
    pub forward_address: String,
    #[serde(default = "default_protocol")]
    pub forward_protocol: String,
}

const DEFAULT_SPIN_UP: Duration = Duration::from_secs(5);
const DEFAULT_COOL_DOWN: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laziness {
    #[serde(default, with = "humantime_opt")]
    pub spin_up_timeout: Option<Duration>,
    #[serde(default, with = "humantime_opt")]
    pub cool_down_timeout: Option<Duration>,
}

impl Laziness {
    pub fn spin_up_timeout(&self) -> Duration {
        self.spin_up_timeout.unwrap_or(DEFAULT_SPIN_UP)
    }

    pub fn cool_down_timeout(&self) -> Duration {
        self.cool_down_timeout.unwrap_or(DEFAULT_COOL_DOWN)
    }
}

/// Config values arrive as fully-formed `Ignition` data (duration parsing is
/// the config-discovery collaborator's job, out of scope per §1), but we
/// still need *a* wire representation for tests and the CLI's JSON fixtures:
/// durations are seconds as a plain integer.
mod humantime_opt {
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
mod tests {
    use super::*;

    #[test]
    fn laziness_defaults_match_spec() {
        let l = Laziness {
            spin_up_timeout: None,
            cool_down_timeout: None,
        };
        assert_eq!(l.spin_up_timeout(), Duration::from_secs(5));
        assert_eq!(l.cool_down_timeout(), Duration::from_secs(15 * 60));
    }
}
