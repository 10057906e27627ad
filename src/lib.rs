//! SBC Solver - an HTTP front end for a squad-building challenge solver.
//!
//! This library provides the request-dispatch and shared-log layer around an
//! external solver: a bounded worker pool for blocking solves, a process-wide
//! diagnostic log buffer, and the axum routes that tie them together.

pub mod config;
pub mod logs;
pub mod pool;
pub mod server;
pub mod solver;

#[cfg(test)]
pub(crate) mod test_utils;
