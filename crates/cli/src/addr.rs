// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--api` address parsing: `tcp:<host:port>` or `unix:<path>`, the same
//! two schemes the control API itself binds to (§4.6/§11).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddrError {
    #[error("malformed api address {0:?}: expected tcp:<host:port> or unix:<path>")]
    BadAddress(String),
}

#[derive(Debug, Clone)]
pub enum ApiAddr {
    Tcp(String),
    Unix(PathBuf),
}

impl ApiAddr {
    pub fn parse(raw: &str) -> Result<Self, AddrError> {
        if let Some(addr) = raw.strip_prefix("tcp:") {
            return Ok(ApiAddr::Tcp(addr.to_string()));
        }
        if let Some(path) = raw.strip_prefix("unix:") {
            return Ok(ApiAddr::Unix(PathBuf::from(path)));
        }
        Err(AddrError::BadAddress(raw.to_string()))
    }

    /// The `Host:` header / request-target host to send; unix sockets have
    /// no real host, so a placeholder is used, mirroring the Go client's
    /// `http://unix` trick for its `DialContext`-based transport.
    pub fn host_header(&self) -> &str {
        match self {
            ApiAddr::Tcp(addr) => addr,
            ApiAddr::Unix(_) => "unix",
        }
    }
}
