// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-watch rules (§3 `Watch`, §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watch {
    pub glob_pattern: String,
    pub signal: i32,
    #[serde(default)]
    pub restart: bool,
    #[serde(default)]
    pub pre_command: Option<WatchCommand>,
    #[serde(default)]
    pub post_command: Option<WatchCommand>,
}
