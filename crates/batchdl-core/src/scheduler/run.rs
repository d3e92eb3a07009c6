//! Drive one job: dispatch every item under the worker budget and record outcomes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use crate::fetcher::{FetchOutcome, Fetcher};
use crate::job::Job;

use super::budget::{WorkerBudget, WorkerSlot};

/// Runs every item of `job`, at most `budget.max()` fetches in flight process-wide.
///
/// A slot is acquired before each item is spawned, so queued items wait here
/// rather than as parked tasks. Returns once every item has been recorded.
pub(super) async fn run_job(fetcher: Arc<dyn Fetcher>, budget: Arc<WorkerBudget>, job: Arc<Job>) {
    let started = Instant::now();
    tracing::info!(job = %job.id(), total = job.total(), "job started");

    let mut items = JoinSet::new();
    for url in job.urls().iter().cloned() {
        let slot = budget.acquire().await;
        let fetcher = Arc::clone(&fetcher);
        let job = Arc::clone(&job);
        items.spawn_blocking(move || fetch_and_record(fetcher.as_ref(), &job, &url, slot));
    }

    while let Some(res) = items.join_next().await {
        if let Err(e) = res {
            tracing::error!(job = %job.id(), "item task join: {}", e);
        }
    }

    tracing::info!(
        job = %job.id(),
        total = job.total(),
        completed = job.completed(),
        succeeded = job.succeeded(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "job finished"
    );
}

/// Fetches one item on the blocking pool and records its outcome.
///
/// The slot is held for exactly as long as the transfer runs. Blocking tasks
/// cannot be aborted, so even if the driver is dropped the outcome is still
/// recorded and the slot is released only when the fetch has returned. A
/// panic inside the fetcher becomes a failed outcome for this item only.
fn fetch_and_record(fetcher: &dyn Fetcher, job: &Job, url: &str, slot: WorkerSlot) {
    let item_started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(url))).unwrap_or_else(
        |payload| {
            let reason = panic_message(payload.as_ref());
            tracing::error!(url, "fetch worker aborted: {}", reason);
            FetchOutcome::failed(format!("worker aborted: {}", reason))
        },
    );
    drop(slot);
    tracing::debug!(
        job = %job.id(),
        url,
        ok = outcome.succeeded,
        elapsed_ms = item_started.elapsed().as_millis() as u64,
        "item finished"
    );
    job.record(url, outcome.succeeded, outcome.message);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "panic"
    }
}
