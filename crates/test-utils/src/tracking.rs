//! Request logs for asserting what a mock transport was asked to do.
//!
//! ```
//! use graphql_test_utils::RequestLog;
//!
//! let log: RequestLog<&str> = RequestLog::default();
//! log.record("first");
//! let checkpoint = log.checkpoint();
//! log.record("second");
//! assert_eq!(log.since(checkpoint), vec!["second"]);
//! assert_eq!(log.len(), 2);
//! ```

use std::sync::{Arc, Mutex, PoisonError};

/// A shared, append-only log. Clones see the same entries.
#[derive(Debug)]
pub struct RequestLog<T> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for RequestLog<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> Clone for RequestLog<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Clone> RequestLog<T> {
    pub fn record(&self, entry: T) {
        self.lock().push(entry);
    }

    /// Position to pass to [`since`](Self::since) later.
    #[must_use]
    pub fn checkpoint(&self) -> usize {
        self.lock().len()
    }

    /// Entries recorded after `checkpoint`.
    #[must_use]
    pub fn since(&self, checkpoint: usize) -> Vec<T> {
        self.lock().get(checkpoint..).map(<[T]>::to_vec).unwrap_or_default()
    }

    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.since(0)
    }

    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
