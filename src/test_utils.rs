//! Shared test utilities: canned solvers and request builders.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use serde_json::{Value, json};

use crate::solver::{MaxSolveTime, SolveRequest, Solver, SolverError};

/// A small but complete `/solve` body.
pub fn sample_body() -> Value {
    json!({
        "sbcData": { "name": "Hybrid Leagues", "requirements": [{ "minTeamRating": 83 }] },
        "clubPlayers": [
            { "id": 101, "rating": 84, "league": 13 },
            { "id": 102, "rating": 82, "league": 53 }
        ],
        "maxSolveTime": 30
    })
}

/// The request corresponding to [`sample_body`].
pub fn sample_request() -> SolveRequest {
    SolveRequest {
        sbc_data: sample_body()["sbcData"].clone(),
        club_players: sample_body()["clubPlayers"].clone(),
        max_solve_time: MaxSolveTime::from_secs(30),
    }
}

/// A solver that always returns `result`.
pub fn succeeding_solver(result: Value) -> Arc<dyn Solver> {
    Arc::new(move |_: &Value, _: &Value, _: &MaxSolveTime| {
        Ok::<_, SolverError>(result.clone())
    })
}

/// A solver that always fails with `message`.
pub fn failing_solver(message: &str) -> Arc<dyn Solver> {
    let message = message.to_string();
    Arc::new(move |_: &Value, _: &Value, _: &MaxSolveTime| {
        Err::<Value, _>(SolverError::new(message.clone()))
    })
}

/// A one-shot latch.
#[derive(Default)]
struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    fn open(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = self.cond.wait(open).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// A solver that blocks inside `run_auto_sbc` until released.
///
/// Lets tests hold a solve open while other requests run.
#[derive(Clone)]
pub struct GatedSolver {
    entered: Arc<Gate>,
    released: Arc<Gate>,
    result: Value,
}

impl GatedSolver {
    pub fn new(result: Value) -> Self {
        GatedSolver {
            entered: Arc::new(Gate::default()),
            released: Arc::new(Gate::default()),
            result,
        }
    }

    /// The solver half, to hand to an orchestrator.
    pub fn solver(&self) -> Arc<dyn Solver> {
        let gate = self.clone();
        Arc::new(move |_: &Value, _: &Value, _: &MaxSolveTime| {
            gate.entered.open();
            gate.released.wait();
            Ok::<_, SolverError>(gate.result.clone())
        })
    }

    /// Blocks the current thread until the solver has been entered.
    pub fn wait_until_entered(&self) {
        self.entered.wait();
    }

    /// Async variant of [`wait_until_entered`](Self::wait_until_entered).
    pub async fn entered(&self) {
        let gate = Arc::clone(&self.entered);
        tokio::task::spawn_blocking(move || gate.wait())
            .await
            .unwrap();
    }

    /// Lets the blocked solve return.
    pub fn release(&self) {
        self.released.open();
    }
}
