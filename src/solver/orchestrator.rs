//! Per-solve lifecycle.
//!
//! ```text
//! reset logs ─► "Solver started" ─► run solver ─┬─► "Solver completed" ─► Ok(result)
//!                                               └─► "Solver error: .." ─► Err(error)
//! ```
//!
//! A solver that panics is treated like one that returned an error: the
//! panic message becomes the error.
//!
//! The orchestrator is synchronous and is meant to run on a worker pool
//! thread. It keeps no state between solves other than the shared
//! [`LogBuffer`], and never retries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use super::contract::{Solver, SolverError};
use super::request::SolveRequest;
use crate::logs::{LogBuffer, SOLVER_COMPLETED, SOLVER_STARTED, solver_error_line};
use crate::pool::worker_pool::panic_message;

/// Runs solves against a [`Solver`], recording progress in a [`LogBuffer`].
#[derive(Clone)]
pub struct SolveOrchestrator {
    logs: LogBuffer,
    solver: Arc<dyn Solver>,
}

impl SolveOrchestrator {
    pub fn new(logs: LogBuffer, solver: Arc<dyn Solver>) -> Self {
        SolveOrchestrator { logs, solver }
    }

    /// Returns the log buffer this orchestrator writes to.
    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    /// Runs one solve.
    ///
    /// Clears the shared log buffer first, discarding lines from any solve
    /// still in progress. The solver's result or error is returned unchanged.
    #[instrument(skip_all, fields(max_solve_time = %request.max_solve_time))]
    pub fn run(&self, request: &SolveRequest) -> Result<Value, SolverError> {
        self.logs.reset();
        self.logs.append(SOLVER_STARTED);
        info!("Solve started");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.solver.run_auto_sbc(
                &request.sbc_data,
                &request.club_players,
                &request.max_solve_time,
            )
        }))
        .unwrap_or_else(|payload| Err(SolverError::new(panic_message(payload))));

        match outcome {
            Ok(result) => {
                self.logs.append(SOLVER_COMPLETED);
                info!("Solve completed");
                Ok(result)
            }
            Err(e) => {
                self.logs.append(solver_error_line(&e));
                warn!(error = %e, "Solve failed");
                Err(e)
            }
        }
    }
}
