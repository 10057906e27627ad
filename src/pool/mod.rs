//! Bounded pool for blocking work.
//!
//! Request handlers run on the async runtime and must never block it. Anything
//! that may take real time (the solver above all) is handed to a
//! [`WorkerPool`], which runs it on the runtime's blocking threads while
//! capping how many such tasks run at once.
//!
//! # Module Structure
//!
//! - [`worker_pool`]: the pool itself (slots, FIFO queueing, shutdown)
//! - [`dispatch`]: adapter that lifts a fallible blocking call into an awaitable

pub mod dispatch;
pub mod worker_pool;

pub use dispatch::run_blocking;
pub use worker_pool::{DEFAULT_WORKERS, MAX_WORKERS, PoolError, WorkerPool};
