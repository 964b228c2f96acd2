// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boot-job runner (§4.3): launch every boot job concurrently, each under
//! its own deadline; the first non-`can_fail` error aborts the rest.

use crate::error::RuntimeError;
use ignite_adapters::{Executor, SpawnSpec};
use tokio_util::sync::CancellationToken;

fn spawn_spec(config: &ignite_core::BootJobConfig) -> SpawnSpec {
    SpawnSpec {
        job_name: config.base.name.clone(),
        command: config.base.command.clone(),
        args: config.base.args.clone(),
        env: config.base.env.clone(),
        working_dir: config.base.working_dir.clone(),
        stdout_path: config.base.stdout_path.clone(),
        stderr_path: config.base.stderr_path.clone(),
        timestamp_format: config.base.timestamp_format.clone(),
    }
}

async fn run_one<E: Executor>(
    executor: &E,
    config: &ignite_core::BootJobConfig,
    cancel: &CancellationToken,
) -> Result<(), RuntimeError> {
    let name = config.base.name.clone();
    let can_fail = config.base.can_fail;
    let timeout = config.timeout();

    let attempt = async {
        let handle = executor
            .spawn(spawn_spec(config))
            .await
            .map_err(|source| RuntimeError::BootFailed {
                job: name.clone(),
                source: std::io::Error::other(source.to_string()),
            })?;

        let outcome = executor
            .wait(&handle)
            .await
            .map_err(|source| RuntimeError::BootFailed {
                job: name.clone(),
                source,
            })?;

        if outcome.success {
            Ok(())
        } else if can_fail {
            tracing::warn!(job = %name, "boot job failed but is marked can_fail");
            Ok(())
        } else {
            Err(RuntimeError::BootFailed {
                job: name.clone(),
                source: std::io::Error::other(format!(
                    "boot job {name} exited with code {:?}",
                    outcome.code
                )),
            })
        }
    };

    tokio::select! {
        result = tokio::time::timeout(timeout, attempt) => {
            match result {
                Ok(inner) => inner,
                Err(_) if can_fail => {
                    tracing::warn!(job = %name, "boot job timed out but is marked can_fail");
                    Ok(())
                }
                Err(_) => Err(RuntimeError::BootTimeout {
                    job: name,
                    timeout_secs: timeout.as_secs(),
                }),
            }
        }
        _ = cancel.cancelled() => Ok(()),
    }
}

/// Runs all boot jobs concurrently to completion. Cancellation aborts every
/// in-flight boot job. The first non-`can_fail` failure is returned, but
/// every job is still allowed to run — there is no early abort of siblings,
/// matching "launches every boot job concurrently... all boot jobs must
/// finish before Run begins" (§4.3).
pub async fn boot<E: Executor>(
    executor: &E,
    boot_jobs: &[ignite_core::BootJobConfig],
    cancel: &CancellationToken,
) -> Result<(), RuntimeError> {
    let results = futures_util::future::join_all(
        boot_jobs
            .iter()
            .map(|config| run_one(executor, config, cancel)),
    )
    .await;

    for result in results {
        result?;
    }
    Ok(())
}
