// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the supervisor loop can surface (§7, §4.7).

use ignite_core::MaxRetriesExceeded;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    MaxRetriesExceeded(#[from] MaxRetriesExceeded),
    #[error("boot job {job} timed out after {timeout_secs}s")]
    BootTimeout { job: String, timeout_secs: u64 },
    #[error("boot job {job} failed: {source}")]
    BootFailed {
        job: String,
        #[source]
        source: std::io::Error,
    },
    #[error("listener {address} failed: {source}")]
    ListenerFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },
}
