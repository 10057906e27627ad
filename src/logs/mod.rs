//! Diagnostic log lines exposed through `GET /solver-logs`.
//!
//! The service keeps a single, process-wide buffer of human-readable lines
//! describing what the solver pipeline is doing. The buffer is shared by every
//! request: a solve resets it on start, so lines from an overlapping solve may
//! be discarded. Entries carry no request identifier.
//!
//! These lines are distinct from process logging. Every mutation is also
//! mirrored to `tracing` so the operator's log pipeline sees the same events.

mod buffer;

pub use buffer::LogBuffer;

/// Line recorded when a solve begins.
pub const SOLVER_STARTED: &str = "Solver started";

/// Line recorded when the solver returns a result.
pub const SOLVER_COMPLETED: &str = "Solver completed";

/// Line recorded by the shutdown hook.
pub const SERVICE_SHUTTING_DOWN: &str = "Service shutting down";

/// Formats the line recorded when the solver fails.
pub fn solver_error_line(message: impl std::fmt::Display) -> String {
    format!("Solver error: {}", message)
}

/// Formats the line recorded when an HTTP request to `/solve` fails.
pub fn api_error_line(message: impl std::fmt::Display) -> String {
    format!("API Error: {}", message)
}
