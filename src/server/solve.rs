//! Solve endpoint handler.
//!
//! Parses the request body, hands the solve to the worker pool and returns
//! whatever the solver produced. Every failure on this path is recorded in the
//! solver log buffer as an `API Error` line before the response goes out.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::logs::api_error_line;
use crate::pool::{PoolError, run_blocking};
use crate::solver::{SolveRequest, SolverError};

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is not JSON, or is missing a required field.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The solver reported a failure.
    #[error("{0}")]
    Solver(#[from] SolverError),

    /// The worker pool could not run the work.
    #[error("{0}")]
    Pool(#[from] PoolError),
}

/// JSON body sent with every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Returns the HTTP status for this error.
    ///
    /// Clients only distinguish success from failure, so every failure is a
    /// server error, malformed bodies included.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Solver(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Solve handler.
///
/// # Request
///
/// - Method: POST
/// - Body: `{"sbcData": ..., "clubPlayers": ..., "maxSolveTime": <seconds>}`
///
/// # Response
///
/// - 200 OK with the solver's result as the JSON body
/// - 500 Internal Server Error with `{"error": "..."}` for a malformed body,
///   a solver failure, or an unavailable worker pool
pub async fn solve_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    match solve(&app_state, &body).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(error = %e, "Solve request failed");
            app_state.logs().append(api_error_line(&e));
            Err(e)
        }
    }
}

async fn solve(app_state: &AppState, body: &[u8]) -> Result<Value, ApiError> {
    let request = SolveRequest::from_slice(body)?;

    debug!(
        max_solve_time = %request.max_solve_time,
        in_flight = app_state.pool().in_flight(),
        "Dispatching solve"
    );

    let orchestrator = app_state.orchestrator().clone();
    let result = run_blocking(app_state.pool(), move || {
        orchestrator.run(&request).map_err(ApiError::from)
    })
    .await?;

    info!("Solve request succeeded");
    Ok(result)
}
