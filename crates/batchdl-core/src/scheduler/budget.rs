//! Worker budget shared by every job in the process.
//!
//! A fetch may only run while holding a [`WorkerSlot`]; there are exactly
//! `max` slots. Waiters are served in FIFO order, so concurrently submitted
//! jobs interleave instead of one job starving the others.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
pub struct WorkerBudget {
    max: usize,
    permits: Arc<Semaphore>,
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl WorkerBudget {
    /// Create a budget of `max` concurrent fetches (at least one).
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            max,
            permits: Arc::new(Semaphore::new(max)),
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Highest number of slots ever held at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Waits for a free slot. The slot is released when dropped.
    pub async fn acquire(self: &Arc<Self>) -> WorkerSlot {
        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(p) => Some(p),
            // The semaphore is never closed; run unbounded rather than stall if it ever is.
            Err(_) => None,
        };
        let now = self.in_use.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(now, Ordering::AcqRel);
        WorkerSlot {
            budget: Arc::clone(self),
            _permit: permit,
        }
    }
}

/// One reserved fetch slot; releases the slot when dropped.
#[derive(Debug)]
pub struct WorkerSlot {
    budget: Arc<WorkerBudget>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.budget.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
