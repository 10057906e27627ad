//! HTTP server for the SBC solver.
//!
//! This module implements the HTTP surface that:
//! - Accepts solve requests and runs them on the worker pool
//! - Exposes the shared solver log buffer for inspection and clearing
//! - Provides a health check for liveness probes
//!
//! # Endpoints
//!
//! - `GET /` - Returns a fixed health payload
//! - `GET /solver-logs` - Returns the solver log buffer as `{"logs": [...]}`
//! - `POST /solve` - Runs a solve and returns the solver's result
//! - `POST /clear-logs` - Empties the solver log buffer

use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::trace::TraceLayer;

pub mod cors;
pub mod health;
pub mod logs;
pub mod shutdown;
pub mod solve;

pub use cors::cors_layer;
pub use health::health_handler;
pub use logs::{clear_logs_handler, solver_logs_handler};
pub use shutdown::{run_shutdown_hook, serve_until_shutdown, shutdown_signal};
pub use solve::{ApiError, solve_handler};

use crate::logs::LogBuffer;
use crate::pool::WorkerPool;
use crate::solver::{SolveOrchestrator, Solver};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The log
/// buffer and worker pool are shared by every request for the lifetime of
/// the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Diagnostic lines served by `/solver-logs`.
    logs: LogBuffer,

    /// Pool that runs every blocking operation.
    pool: WorkerPool,

    /// Runs solves against the configured solver, writing to `logs`.
    orchestrator: SolveOrchestrator,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `logs` - Buffer shared by all requests
    /// * `pool` - Worker pool for blocking work
    /// * `solver` - The external solver
    pub fn new(logs: LogBuffer, pool: WorkerPool, solver: Arc<dyn Solver>) -> Self {
        let orchestrator = SolveOrchestrator::new(logs.clone(), solver);
        AppState {
            inner: Arc::new(AppStateInner {
                logs,
                pool,
                orchestrator,
            }),
        }
    }

    /// Returns the solver log buffer.
    pub fn logs(&self) -> &LogBuffer {
        &self.inner.logs
    }

    /// Returns the worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.inner.pool
    }

    /// Returns the solve orchestrator.
    pub fn orchestrator(&self) -> &SolveOrchestrator {
        &self.inner.orchestrator
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState, allowed_origins: Vec<HeaderValue>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(health_handler))
        .route("/solver-logs", get(solver_logs_handler))
        .route("/solve", post(solve_handler))
        .route("/clear-logs", post(clear_logs_handler))
        .with_state(app_state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
