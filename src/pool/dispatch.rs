//! Adapter from blocking calls to awaitable pool submissions.
//!
//! Handlers want to write `run_blocking(&pool, move || work(args)).await?` and
//! get back exactly what `work` returned, with its error flowing through the
//! handler's own error type. Failures of the pool itself (shut down, panicked
//! task) are folded into that same error type via `From<PoolError>`.

use super::worker_pool::{PoolError, WorkerPool};

/// Runs a fallible blocking closure on the pool and waits for its outcome.
///
/// The closure's `Ok` value and `Err` value are both passed through
/// untouched. Pool failures are converted with `E::from`.
pub async fn run_blocking<F, T, E>(pool: &WorkerPool, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<PoolError> + Send + 'static,
{
    pool.submit(f).await?
}
