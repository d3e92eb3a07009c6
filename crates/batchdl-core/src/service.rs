//! Submit/poll facade over the registry and scheduler.
//!
//! One `BatchService` is built at process start and shared (via `Arc`) with
//! whatever front end accepts submissions and polls.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BatchConfig;
use crate::fetcher::{CurlFetcher, FetchSettings, Fetcher};
use crate::job::{JobId, JobSnapshot};
use crate::registry::JobRegistry;
use crate::scheduler::{Scheduler, SchedulerError};

/// Splits newline-separated URL text: lines trimmed, blank lines dropped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct BatchService {
    registry: JobRegistry,
    scheduler: Scheduler,
}

impl BatchService {
    /// Service fetching with libcurl according to `cfg`.
    pub fn new(cfg: &BatchConfig) -> Self {
        let fetcher = Arc::new(CurlFetcher::new(FetchSettings::from(cfg)));
        Self::with_fetcher(fetcher, cfg.worker_budget())
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, workers: usize) -> Self {
        Self {
            registry: JobRegistry::new(),
            scheduler: Scheduler::new(fetcher, workers),
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Submits newline-separated URL text; see [`parse_url_list`].
    pub fn submit_text(&self, text: &str) -> Result<JobId, SchedulerError> {
        self.submit_urls(parse_url_list(text))
    }

    /// Creates a job for `urls` and starts it in the background.
    ///
    /// The job is registered only once the scheduler has admitted it, so a
    /// rejected submission leaves nothing behind in the registry.
    /// Must be called from within a tokio runtime.
    pub fn submit_urls(&self, urls: Vec<String>) -> Result<JobId, SchedulerError> {
        let job = self
            .scheduler
            .submit_with(|| self.registry.create_job(urls))?;
        tracing::info!(job = %job.id(), total = job.total(), "job submitted");
        Ok(job.id())
    }

    /// Current snapshot; the zero snapshot for unknown ids.
    pub fn poll(&self, id: &JobId) -> JobSnapshot {
        self.registry.get(id)
    }

    /// Like [`poll`](Self::poll) for a raw id string.
    pub fn poll_str(&self, id: &str) -> JobSnapshot {
        self.registry.get_str(id)
    }

    /// Polls every `interval` until the job is terminal, calling `on_progress`
    /// with each snapshot (including the final one).
    pub async fn wait<F>(&self, id: &JobId, interval: Duration, mut on_progress: F) -> JobSnapshot
    where
        F: FnMut(&JobSnapshot),
    {
        loop {
            let snap = self.poll(id);
            on_progress(&snap);
            if snap.is_terminal() {
                return snap;
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Stops accepting jobs and drains the worker pool.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await
    }
}
