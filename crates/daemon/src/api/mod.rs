// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control API (§4.6): one HTTP server per supervisor process, exposing
//! start/restart/stop/status/list over `/v1` and a WebSocket log stream.

mod logs;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use ignite_adapters::TokioExecutor;
use ignite_engine::{ControlOutcome, JobControl};

pub type AppState = JobControl<TokioExecutor>;

/// Builds the `/v1` router. Kept generic over nothing beyond `TokioExecutor`
/// since the daemon binary is the only axum entry point and always runs
/// against the real process executor.
pub fn router(control: AppState) -> Router {
    Router::new()
        .route("/v1/jobs", get(list_jobs))
        .route("/v1/job/{name}/start", post(start_job))
        .route("/v1/job/{name}/restart", post(restart_job))
        .route("/v1/job/{name}/stop", post(stop_job))
        .route("/v1/job/{name}/status", get(job_status))
        .route("/v1/job/{name}/logs", get(logs::logs_handler))
        .with_state(control)
}

async fn list_jobs(State(control): State<AppState>) -> impl IntoResponse {
    Json(control.list())
}

async fn job_status(
    State(control): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match control.status(&name) {
        Some(status) => (StatusCode::OK, Json(status)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_job(State(control): State<AppState>, Path(name): Path<String>) -> StatusCode {
    outcome_to_status(control.start(&name).await)
}

async fn restart_job(State(control): State<AppState>, Path(name): Path<String>) -> StatusCode {
    outcome_to_status(control.restart(&name).await)
}

async fn stop_job(State(control): State<AppState>, Path(name): Path<String>) -> StatusCode {
    outcome_to_status(control.stop(&name).await)
}

fn outcome_to_status(outcome: ControlOutcome) -> StatusCode {
    match outcome {
        ControlOutcome::Ok => StatusCode::OK,
        ControlOutcome::NotFound => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_core::Ignition;
    use tokio_util::sync::CancellationToken;

    fn make_control() -> AppState {
        let ignition = Ignition::default();
        let supervisor =
            ignite_engine::Supervisor::new(TokioExecutor::new(), ignition, CancellationToken::new());
        supervisor.control()
    }

    #[tokio::test]
    async fn status_of_unknown_job_is_none() {
        let control = make_control();
        assert!(control.status("ghost").is_none());
    }

    #[test]
    fn builds_router_without_panicking() {
        let _router = router(make_control());
    }
}
