//! Endpoints for reading and clearing the solver log buffer.
//!
//! Both operations are cheap, but they still go through the worker pool and
//! [`run_blocking`] like every other piece of work, so buffer access and pool
//! failures are handled the same way as for `/solve`.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AppState;
use super::solve::ApiError;
use crate::pool::run_blocking;

/// Body returned by `GET /solver-logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverLogs {
    pub logs: Vec<String>,
}

/// Body returned by `POST /clear-logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsCleared {
    pub cleared: bool,
}

/// Returns a snapshot of the solver log buffer.
///
/// # Response
///
/// - 200 OK with `{"logs": [...]}`
/// - 500 Internal Server Error if the worker pool has shut down
pub async fn solver_logs_handler(
    State(app_state): State<AppState>,
) -> Result<Json<SolverLogs>, ApiError> {
    let buffer = app_state.logs().clone();
    let logs =
        run_blocking(app_state.pool(), move || Ok::<_, ApiError>(buffer.snapshot())).await?;

    debug!(lines = logs.len(), "Serving solver logs");
    Ok(Json(SolverLogs { logs }))
}

/// Empties the solver log buffer.
///
/// # Response
///
/// - 200 OK with `{"cleared": true}`
/// - 500 Internal Server Error if the worker pool has shut down
pub async fn clear_logs_handler(
    State(app_state): State<AppState>,
) -> Result<Json<LogsCleared>, ApiError> {
    let buffer = app_state.logs().clone();
    run_blocking(app_state.pool(), move || {
        buffer.reset();
        Ok::<_, ApiError>(())
    })
    .await?;

    debug!("Solver logs cleared");
    Ok(Json(LogsCleared { cleared: true }))
}
