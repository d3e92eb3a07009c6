//! Bounded-concurrency job scheduler.
//!
//! Every job submitted to one [`Scheduler`] shares a single [`WorkerBudget`],
//! so the worker count caps concurrent fetches for the whole process no matter
//! how many jobs are queued back to back.

mod budget;
mod run;

pub use budget::{WorkerBudget, WorkerSlot};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio_util::task::TaskTracker;

use crate::fetcher::Fetcher;
use crate::job::Job;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is shutting down; no new jobs accepted")]
    ShuttingDown,
}

pub struct Scheduler {
    fetcher: Arc<dyn Fetcher>,
    budget: Arc<WorkerBudget>,
    tracker: TaskTracker,
    /// Guards the accept decision together with the spawn it admits, so no
    /// job can start after `shutdown` has closed the tracker.
    accepting: Mutex<bool>,
}

impl Scheduler {
    pub fn new(fetcher: Arc<dyn Fetcher>, workers: usize) -> Self {
        Self {
            fetcher,
            budget: Arc::new(WorkerBudget::new(workers)),
            tracker: TaskTracker::new(),
            accepting: Mutex::new(true),
        }
    }

    /// Worker budget (maximum concurrent fetches).
    pub fn workers(&self) -> usize {
        self.budget.max()
    }

    /// Fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.budget.in_use()
    }

    /// Highest number of fetches that ran at once since creation.
    pub fn peak_in_flight(&self) -> usize {
        self.budget.peak()
    }

    /// Jobs started by [`run`](Self::run) or [`submit`](Self::submit) that have not finished yet.
    pub fn active_jobs(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_accepting(&self) -> bool {
        *self.accepting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `job` to completion on the shared budget.
    ///
    /// The job is driven by a tracked background task, so dropping this
    /// future stops waiting but does not abandon the job.
    pub async fn run(&self, job: Arc<Job>) {
        let id = job.id();
        let handle = self.tracker.spawn(run::run_job(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.budget),
            job,
        ));
        if let Err(e) = handle.await {
            tracing::error!(job = %id, "job driver: {}", e);
        }
    }

    /// Starts `job` in the background and returns immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job: Arc<Job>) -> Result<(), SchedulerError> {
        self.submit_with(|| job).map(|_| ())
    }

    /// Like [`submit`](Self::submit), but builds the job only once it has been
    /// admitted. `make_job` runs under the accept lock; a job it creates is
    /// therefore always started, never left behind by a concurrent shutdown.
    pub fn submit_with<F>(&self, make_job: F) -> Result<Arc<Job>, SchedulerError>
    where
        F: FnOnce() -> Arc<Job>,
    {
        let accepting = self.accepting.lock().unwrap_or_else(PoisonError::into_inner);
        if !*accepting {
            tracing::warn!("rejecting job: shutting down");
            return Err(SchedulerError::ShuttingDown);
        }
        let job = make_job();
        let fetcher = Arc::clone(&self.fetcher);
        let budget = Arc::clone(&self.budget);
        self.tracker.spawn(run::run_job(fetcher, budget, Arc::clone(&job)));
        Ok(job)
    }

    /// Stops accepting jobs and waits until every accepted job has finished.
    pub async fn shutdown(&self) {
        {
            let mut accepting = self.accepting.lock().unwrap_or_else(PoisonError::into_inner);
            *accepting = false;
            self.tracker.close();
        }
        tracing::info!(active_jobs = self.tracker.len(), "draining worker pool");
        self.tracker.wait().await;
        tracing::info!("worker pool drained");
    }

    /// Like [`shutdown`](Self::shutdown) but gives up waiting after `limit`.
    /// Returns true if the pool drained in time.
    pub async fn shutdown_with_timeout(&self, limit: Duration) -> bool {
        let drained = tokio::time::timeout(limit, self.shutdown()).await.is_ok();
        if !drained {
            tracing::warn!(
                active_jobs = self.tracker.len(),
                in_flight = self.in_flight(),
                "drain timed out"
            );
        }
        drained
    }
}
