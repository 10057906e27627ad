//! The shared log buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Ordered, process-wide sequence of diagnostic lines.
///
/// `LogBuffer` is a cheap handle: clones share the same underlying sequence.
/// Construct one at startup and hand clones to whatever needs to record or
/// read lines. Tests construct their own to stay isolated from each other.
///
/// Every operation takes the internal lock for its whole duration, so an
/// append is never observed half-done by a concurrent `snapshot` or `reset`.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line to the end of the buffer.
    pub fn append(&self, line: impl Into<String>) {
        let line = line.into();
        debug!(line = %line, "solver log");
        self.lock().push(line);
    }

    /// Discards every line currently in the buffer.
    ///
    /// Lines appended by a concurrently running solve are discarded too.
    pub fn reset(&self) {
        let discarded = {
            let mut lines = self.lock();
            let discarded = lines.len();
            lines.clear();
            discarded
        };
        debug!(discarded, "solver log reset");
    }

    /// Returns a copy of the current contents.
    ///
    /// Later mutations of the buffer do not affect the returned vector.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Returns the number of lines currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the buffer holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock can only happen between complete
        // operations on the Vec, so the data behind a poisoned lock is intact.
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
