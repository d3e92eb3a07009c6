//! `batchdl fetch <file>` – run one batch in-process and report progress.

use anyhow::Result;
use batchdl_core::config::BatchConfig;
use batchdl_core::job::JobSnapshot;
use batchdl_core::service::BatchService;
use std::time::Duration;

use super::read_url_text;

/// Returns true if every item succeeded.
pub async fn run_fetch(cfg: &BatchConfig, input: &str, interval: Duration) -> Result<bool> {
    let text = read_url_text(input).await?;
    let service = BatchService::new(cfg);
    let id = service.submit_text(&text)?;
    let total = service.poll(&id).total;
    println!(
        "Job {id}: {total} URL(s), {} worker(s), saving to {}",
        cfg.worker_budget(),
        cfg.download_dir.display()
    );

    let mut last_completed = None;
    let snapshot = service
        .wait(&id, interval, |snap| {
            if last_completed != Some(snap.completed) {
                println!(
                    "  {} / {} done, {} ok, {} failed",
                    snap.completed,
                    snap.total,
                    snap.succeeded,
                    snap.failed()
                );
                last_completed = Some(snap.completed);
            }
        })
        .await;
    service.shutdown().await;

    print_results(&snapshot);
    Ok(snapshot.failed() == 0)
}

fn print_results(snapshot: &JobSnapshot) {
    if snapshot.urls.is_empty() {
        println!("No URLs submitted.");
        return;
    }
    for url in &snapshot.urls {
        let outcome = snapshot.result(url).unwrap_or("pending");
        println!("{:<8} {}", outcome_label(outcome), url);
        println!("         {}", outcome);
    }
}

fn outcome_label(outcome: &str) -> &'static str {
    if outcome == "pending" {
        "PENDING"
    } else if outcome.starts_with("failed") {
        "FAILED"
    } else {
        "OK"
    }
}
