//! The solve pipeline around the external SBC solver.
//!
//! The search algorithm itself lives behind the [`Solver`] trait and is not
//! part of this crate. This module defines the request shape accepted from
//! clients, the contract the solver must satisfy, and the orchestrator that
//! wraps each solve with diagnostic log lines.
//!
//! # Module Structure
//!
//! - [`contract`]: the [`Solver`] trait, its error and the solve-time type
//! - [`request`]: the `/solve` request body
//! - [`orchestrator`]: per-solve lifecycle (reset, log, run, log outcome)

pub mod contract;
pub mod orchestrator;
pub mod request;

pub use contract::{MaxSolveTime, Solver, SolverError, UnconfiguredSolver};
pub use orchestrator::SolveOrchestrator;
pub use request::SolveRequest;
