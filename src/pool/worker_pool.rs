//! Fixed-capacity pool of blocking execution slots.
//!
//! # Slots and Queueing
//!
//! The pool owns `capacity` slots, modelled as permits of a fair
//! [`Semaphore`]. A submission waits for a permit, then runs on the runtime's
//! blocking threads while holding it. Tokio's semaphore grants permits in the
//! order they were requested, so waiting submissions are served FIFO.
//!
//! # Shutdown
//!
//! [`WorkerPool::shutdown`] closes the semaphore, which fails every queued and
//! future submission with [`PoolError::ShutDown`]. Tasks already running are
//! left alone: they are never cancelled, and the caller chooses whether to
//! wait for them.
//!
//! # Failures
//!
//! A task that panics does not take the pool down. The panic is caught by the
//! blocking thread and surfaced to the submitter as [`PoolError::Panicked`];
//! the slot is released as the task unwinds.

use std::any::Any;
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

/// Default number of slots.
///
/// Kept small so a deployment with tight CPU and memory limits is not
/// overrun by concurrent solves.
pub const DEFAULT_WORKERS: usize = 2;

/// Largest number of slots a pool can have.
pub const MAX_WORKERS: usize = Semaphore::MAX_PERMITS;

/// Errors produced by the pool itself, as opposed to errors returned by tasks.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool no longer accepts work.
    #[error("worker pool is shut down")]
    ShutDown,

    /// The task panicked while running.
    #[error("worker task panicked: {0}")]
    Panicked(String),

    /// The task was cancelled by the runtime before it could finish.
    #[error("worker task was cancelled")]
    Cancelled,
}

/// A bounded pool for blocking work.
///
/// Cloning is cheap; clones share slots, queue, and shutdown state.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    capacity: NonZeroUsize,

    /// One permit per slot.
    slots: Arc<Semaphore>,

    /// Tracks started tasks so shutdown can wait for them.
    tasks: TaskTracker,
}

impl WorkerPool {
    /// Creates a pool with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_WORKERS`].
    pub fn new(capacity: NonZeroUsize) -> Self {
        debug!(capacity = capacity.get(), "Creating worker pool");

        WorkerPool {
            inner: Arc::new(PoolInner {
                capacity,
                slots: Arc::new(Semaphore::new(capacity.get())),
                tasks: TaskTracker::new(),
            }),
        }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.inner.capacity.get()
    }

    /// Returns the number of tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.inner.slots.is_closed()
    }

    /// Runs `task` on a blocking thread once a slot is free.
    ///
    /// If every slot is busy the call waits, behind earlier submissions, until
    /// one is released. Resolves to whatever `task` returned.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ShutDown`] if the pool was shut down before the task got
    ///   a slot.
    /// - [`PoolError::Panicked`] if the task panicked.
    /// - [`PoolError::Cancelled`] if the runtime dropped the task.
    pub async fn submit<F, T>(&self, task: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        trace!(in_flight = self.in_flight(), "Waiting for worker slot");

        let permit = Arc::clone(&self.inner.slots)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)?;

        trace!("Worker slot acquired");

        let handle = self.inner.tasks.spawn_blocking(move || {
            // Held for the lifetime of the task, released on return or unwind.
            let _permit = permit;
            task()
        });

        match handle.await {
            Ok(value) => Ok(value),
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                warn!(error = %message, "Worker task panicked");
                Err(PoolError::Panicked(message))
            }
            Err(_) => Err(PoolError::Cancelled),
        }
    }

    /// Stops accepting work.
    ///
    /// Queued submissions are released with [`PoolError::ShutDown`]. Running
    /// tasks continue; with `wait` set this resolves only after they have all
    /// finished, otherwise it returns immediately and the tasks are abandoned
    /// to finish (or not) on their own.
    pub async fn shutdown(&self, wait: bool) {
        self.inner.slots.close();
        self.inner.tasks.close();

        info!(
            in_flight = self.in_flight(),
            wait, "Worker pool shutting down"
        );

        if wait {
            self.inner.tasks.wait().await;
            debug!("Worker pool drained");
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        // DEFAULT_WORKERS is non-zero.
        WorkerPool::new(NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN))
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Barrier, Mutex, mpsc};
    use std::time::Duration;

    fn pool_of(n: usize) -> WorkerPool {
        WorkerPool::new(NonZeroUsize::new(n).unwrap())
    }

    /// Occupies one slot until the returned sender is dropped or signalled.
    ///
    /// Resolves only once the gate task is actually running.
    async fn occupy_slot(
        pool: &WorkerPool,
    ) -> (mpsc::Sender<()>, tokio::task::JoinHandle<Result<(), PoolError>>) {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

        let pool = pool.clone();
        let handle = tokio::spawn(async move {
            pool.submit(move || {
                let _ = started_tx.send(());
                let _ = release_rx.recv();
            })
            .await
        });

        started_rx.await.unwrap();
        (release_tx, handle)
    }

    /// Runs `tasks` sleeping tasks and returns the peak number running at once.
    async fn peak_concurrency(pool: &WorkerPool, tasks: usize, sleep: Duration) -> usize {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let pool = pool.clone();
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    pool.submit(move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(sleep);
                        running.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        peak.load(Ordering::SeqCst)
    }

    // ─── Basic behaviour ───

    #[tokio::test]
    async fn submit_returns_task_value() {
        let pool = pool_of(2);
        let value = pool.submit(|| 6 * 7).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn task_errors_are_returned_as_values() {
        let pool = pool_of(2);
        let result: Result<Result<(), String>, PoolError> =
            pool.submit(|| Err("bad input".to_string())).await;
        assert_eq!(result.unwrap(), Err("bad input".to_string()));
    }

    #[tokio::test]
    async fn capacity_is_reported() {
        assert_eq!(pool_of(3).capacity(), 3);
        assert_eq!(WorkerPool::default().capacity(), DEFAULT_WORKERS);
    }

    #[tokio::test]
    async fn in_flight_counts_running_tasks() {
        let pool = pool_of(2);
        assert_eq!(pool.in_flight(), 0);

        let (release, handle) = occupy_slot(&pool).await;
        assert_eq!(pool.in_flight(), 1);

        release.send(()).unwrap();
        handle.await.unwrap().unwrap();

        // The tracker forgets the task once its blocking closure has returned.
        tokio::time::timeout(Duration::from_secs(1), async {
            while pool.in_flight() != 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    // ─── Concurrency ceiling ───

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn never_runs_more_than_capacity() {
        let pool = pool_of(2);
        let peak = peak_concurrency(&pool, 8, Duration::from_millis(20)).await;
        assert!(peak <= 2, "peak concurrency {} exceeded capacity", peak);
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn slots_run_in_parallel() {
        // Both tasks must be inside the barrier at the same time to pass it.
        let pool = pool_of(2);
        let barrier = Arc::new(Barrier::new(2));

        let first = {
            let pool = pool.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move { pool.submit(move || barrier.wait().is_leader()).await })
        };
        let second = {
            let pool = pool.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move { pool.submit(move || barrier.wait().is_leader()).await })
        };

        let both = tokio::time::timeout(Duration::from_secs(5), async {
            (first.await.unwrap().unwrap(), second.await.unwrap().unwrap())
        })
        .await
        .expect("two slots should run concurrently");

        // Exactly one thread is the barrier leader.
        assert!(both.0 ^ both.1);
    }

    #[tokio::test]
    async fn queued_tasks_run_in_arrival_order() {
        let pool = pool_of(1);
        let (release, gate) = occupy_slot(&pool).await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();

        for i in 0..5 {
            let pool = pool.clone();
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                pool.submit(move || order.lock().unwrap().push(i)).await
            }));
            // Let the submission register in the queue before the next one.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        release.send(()).unwrap();
        gate.await.unwrap().unwrap();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    // ─── Failures ───

    #[tokio::test]
    async fn panics_are_captured_and_pool_survives() {
        let pool = pool_of(1);

        let result = pool.submit(|| -> u32 { panic!("kaboom") }).await;
        match result {
            Err(PoolError::Panicked(msg)) => assert!(msg.contains("kaboom")),
            other => panic!("expected panic error, got {:?}", other),
        }

        // The slot was released during unwinding.
        assert_eq!(pool.submit(|| 1).await.unwrap(), 1);
    }

    #[test]
    fn panic_message_handles_formatted_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(payload), "code 7");

        let payload: Box<dyn Any + Send> = Box::new(12_u8);
        assert_eq!(panic_message(payload), "non-string panic payload");
    }

    // ─── Shutdown ───

    #[tokio::test]
    async fn submit_after_shutdown_fails() {
        let pool = pool_of(2);
        assert!(!pool.is_shut_down());

        pool.shutdown(false).await;

        assert!(pool.is_shut_down());
        assert!(matches!(pool.submit(|| 1).await, Err(PoolError::ShutDown)));
    }

    #[tokio::test]
    async fn shutdown_releases_queued_submissions() {
        let pool = pool_of(1);
        let (release, gate) = occupy_slot(&pool).await;

        let queued = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.submit(|| "ran").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        pool.shutdown(false).await;

        assert!(matches!(queued.await.unwrap(), Err(PoolError::ShutDown)));

        // The task that was already running still completes normally.
        release.send(()).unwrap();
        gate.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn shutdown_without_wait_returns_while_tasks_run() {
        let pool = pool_of(1);
        let (release, gate) = occupy_slot(&pool).await;

        tokio::time::timeout(Duration::from_secs(1), pool.shutdown(false))
            .await
            .expect("shutdown(false) must not wait for running tasks");
        assert_eq!(pool.in_flight(), 1);

        release.send(()).unwrap();
        gate.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn shutdown_with_wait_blocks_until_tasks_finish() {
        let pool = pool_of(1);
        let (release, gate) = occupy_slot(&pool).await;

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.shutdown(true).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        release.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("shutdown(true) should finish once tasks drain")
            .unwrap();
        gate.await.unwrap().unwrap();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// However many tasks are queued, at most `capacity` run at once.
        #[test]
        fn prop_concurrency_bounded_by_capacity(capacity in 1usize..4, extra in 1usize..8) {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            let tasks = capacity + extra;
            let peak = runtime.block_on(async {
                let pool = pool_of(capacity);
                peak_concurrency(&pool, tasks, Duration::from_millis(2)).await
            });

            prop_assert!(peak <= capacity);
        }
    }
}
