//! Process-wide lookup from job id to job state.
//!
//! Insert-only: jobs live for the lifetime of the registry. The map lock is
//! held just long enough to insert or clone an `Arc`, so pollers and workers
//! of different jobs never serialize on it while touching job state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::job::{Job, JobId, JobSnapshot};

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job for `urls` with zero counters and returns it.
    pub fn create_job(&self, urls: Vec<String>) -> Arc<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let mut id = JobId::new();
        while jobs.contains_key(&id) {
            id = JobId::new();
        }
        let job = Arc::new(Job::new(id, urls));
        jobs.insert(id, Arc::clone(&job));
        tracing::debug!(job = %id, total = job.total(), "job registered");
        job
    }

    /// Creates a job for `urls` and returns its identifier.
    pub fn create(&self, urls: Vec<String>) -> JobId {
        self.create_job(urls).id()
    }

    /// Shared handle to a known job.
    pub fn job(&self, id: &JobId) -> Option<Arc<Job>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Current snapshot of `id`; the zero snapshot if the id is unknown.
    pub fn get(&self, id: &JobId) -> JobSnapshot {
        self.job(id).map(|job| job.snapshot()).unwrap_or_default()
    }

    /// Like [`get`](Self::get) for a raw id string; malformed ids are unknown ids.
    pub fn get_str(&self, id: &str) -> JobSnapshot {
        id.parse::<JobId>()
            .map(|id| self.get(&id))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
