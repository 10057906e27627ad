//! Contract between the service and the external solver.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the solver.
///
/// The service never inspects the failure; it only records and returns the
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SolverError {
    message: String,
}

impl SolverError {
    /// Creates an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        SolverError {
            message: message.into(),
        }
    }

    /// Returns the message as reported by the solver.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Time budget handed to the solver.
///
/// Kept as the raw JSON the client sent. The service only requires the field
/// to be present; interpreting (and enforcing) the budget is the solver's job.
/// Clients normally send a number of seconds, which [`as_duration`]
/// understands.
///
/// [`as_duration`]: MaxSolveTime::as_duration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MaxSolveTime(Value);

impl MaxSolveTime {
    /// Wraps a raw JSON value.
    pub fn new(value: Value) -> Self {
        MaxSolveTime(value)
    }

    /// Creates a budget of `secs` whole seconds.
    pub fn from_secs(secs: u64) -> Self {
        MaxSolveTime(Value::from(secs))
    }

    /// Returns the value exactly as the client sent it.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Interprets the value as a number of seconds.
    ///
    /// Returns `None` for anything that is not a finite, non-negative number.
    pub fn as_duration(&self) -> Option<Duration> {
        self.0
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

impl From<Value> for MaxSolveTime {
    fn from(value: Value) -> Self {
        MaxSolveTime(value)
    }
}

impl fmt::Display for MaxSolveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The external SBC solver.
///
/// Implementations run on a blocking worker thread and may take as long as
/// they like; `max_solve_time` is a budget they are expected to honour. The
/// inputs and the result are opaque JSON as far as the service is concerned.
///
/// Any closure with the matching signature is a solver.
pub trait Solver: Send + Sync {
    fn run_auto_sbc(
        &self,
        sbc_data: &Value,
        club_players: &Value,
        max_solve_time: &MaxSolveTime,
    ) -> Result<Value, SolverError>;
}

impl<F> Solver for F
where
    F: Fn(&Value, &Value, &MaxSolveTime) -> Result<Value, SolverError> + Send + Sync,
{
    fn run_auto_sbc(
        &self,
        sbc_data: &Value,
        club_players: &Value,
        max_solve_time: &MaxSolveTime,
    ) -> Result<Value, SolverError> {
        self(sbc_data, club_players, max_solve_time)
    }
}

/// Stand-in used when no solver backend has been linked into the binary.
///
/// Every solve fails with a message saying so, which keeps the HTTP surface,
/// worker pool and log endpoints fully operational.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSolver;

impl Solver for UnconfiguredSolver {
    fn run_auto_sbc(
        &self,
        _sbc_data: &Value,
        _club_players: &Value,
        _max_solve_time: &MaxSolveTime,
    ) -> Result<Value, SolverError> {
        Err(SolverError::new("no solver backend is configured"))
    }
}
