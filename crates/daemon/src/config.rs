// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-side configuration: where the control API binds and where the
//! `Ignition` document describing this run's jobs comes from (SPEC_FULL
//! §10.3 — discovery/parsing of the document itself stays a collaborator's
//! job; this just resolves the couple of things `ignited` needs to boot).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed bind address {0:?}: expected tcp:<host:port> or unix:<path>")]
    BadBindAddress(String),
    #[error("failed to read ignition document at {path}: {source}")]
    ReadIgnition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse ignition document at {path}: {source}")]
    ParseIgnition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the control API's HTTP server listens (§4.6 transport).
#[derive(Debug, Clone)]
pub enum Bind {
    Tcp(String),
    Unix(PathBuf),
}

impl Bind {
    /// Parses `tcp:<host:port>` or `unix:<path>`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if let Some(addr) = raw.strip_prefix("tcp:") {
            return Ok(Bind::Tcp(addr.to_string()));
        }
        if let Some(path) = raw.strip_prefix("unix:") {
            return Ok(Bind::Unix(PathBuf::from(path)));
        }
        Err(ConfigError::BadBindAddress(raw.to_string()))
    }

    /// For a unix bind, create the parent directory (mode 0755) per §4.6.
    pub fn prepare(&self) -> std::io::Result<()> {
        if let Bind::Unix(path) = self {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o755);
                    std::fs::set_permissions(parent, perms)?;
                }
            }
            // A stale socket file from a prior run would otherwise make
            // bind() fail with "address in use".
            let _ = std::fs::remove_file(path);
        }
        Ok(())
    }
}

/// Loads the `Ignition` document this supervisor process should run.
/// `"-"` reads from stdin; anything else is a file path.
pub fn load_ignition(source: &str) -> Result<ignite_core::Ignition, ConfigError> {
    let raw = if source == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ConfigError::ReadIgnition {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|source| ConfigError::ReadIgnition {
            path: PathBuf::from(source),
            source,
        })?
    };

    let mut ignition: ignite_core::Ignition =
        serde_json::from_str(&raw).map_err(|err| ConfigError::ParseIgnition {
            path: PathBuf::from(source),
            source: err,
        })?;
    ignition.normalize();
    Ok(ignition)
}
