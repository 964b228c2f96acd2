// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (§7). Each kind maps to a concrete variant; callers match
//! on kind, not on arbitrary string messages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed duration for job {job}: {value}")]
    BadDuration { job: String, value: String },
    #[error("malformed glob pattern for job {job}: {pattern}")]
    BadGlob { job: String, pattern: String },
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to start job {job}: {source}")]
    Fork {
        job: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open stdio sink for job {job} at {path}: {source}")]
    Stdio {
        job: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ChildExitError {
    #[error("job {job} exited with status {status}")]
    NonZero { job: String, status: String },
    #[error("job {job} was killed by signal {signal}")]
    Signaled { job: String, signal: i32 },
}

#[derive(Debug, Error)]
#[error("reached max retries for job {job}")]
pub struct MaxRetriesExceeded {
    pub job: String,
}

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind listener {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("accept failed on listener {address}: {source}")]
    Accept {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
#[error("job {job} did not start within {timeout_secs}s")]
pub struct ProxyDialError {
    pub job: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("failed to signal job {job}: {source}")]
    SignalFailed {
        job: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("job {0:?} not found or not controllable")]
    NotFound(String),
    #[error("failed to marshal response: {0}")]
    Marshalling(String),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to open log file {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read log file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
