//! Job state: one submitted batch, its per-item outcomes and counters.
//!
//! Workers call [`Job::record`] once per finished item; pollers call
//! [`Job::snapshot`]. Both go through the job's own lock, so a snapshot never
//! shows a counter increment without the matching results entry. The counters
//! are also atomics so progress can be peeked without the lock.

mod id;
mod snapshot;

pub use id::JobId;
pub use snapshot::JobSnapshot;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Mutable record of one batch.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    urls: Vec<String>,
    results: RwLock<HashMap<String, String>>,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
}

impl Job {
    pub fn new(id: JobId, urls: Vec<String>) -> Self {
        Self {
            id,
            urls,
            results: RwLock::new(HashMap::new()),
            completed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn total(&self) -> usize {
        self.urls.len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Acquire)
    }

    pub fn is_terminal(&self) -> bool {
        self.completed() >= self.total()
    }

    /// Records the outcome of one finished item.
    ///
    /// The results entry and both counter increments happen under the write
    /// lock. A duplicate URL overwrites its slot but still counts as an item.
    pub fn record(&self, url: &str, succeeded: bool, message: String) {
        let mut results = self.results.write().unwrap_or_else(PoisonError::into_inner);
        results.insert(url.to_string(), message);
        if succeeded {
            self.succeeded.fetch_add(1, Ordering::AcqRel);
        }
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Consistent point-in-time copy of counters and results.
    pub fn snapshot(&self) -> JobSnapshot {
        let results = self.results.read().unwrap_or_else(PoisonError::into_inner);
        JobSnapshot {
            urls: self.urls.clone(),
            total: self.urls.len(),
            completed: self.completed(),
            succeeded: self.succeeded(),
            results: results.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }
}
