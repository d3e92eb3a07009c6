//! `batchdl serve` – run the service behind the control socket until Ctrl-C.

use anyhow::{Context, Result};
use batchdl_core::config::BatchConfig;
use batchdl_core::service::BatchService;
use std::path::Path;
use std::sync::Arc;

use crate::cli::control_socket;

pub async fn run_serve(cfg: &BatchConfig, socket_path: &Path) -> Result<()> {
    let service = Arc::new(BatchService::new(cfg));
    let listener = control_socket::spawn_control_listener(Arc::clone(&service), socket_path)?;
    tracing::info!(path = %socket_path.display(), workers = cfg.worker_budget(), "control socket listening");
    println!(
        "Listening on {} ({} worker(s), saving to {}). Ctrl-C to stop.",
        socket_path.display(),
        cfg.worker_budget(),
        cfg.download_dir.display()
    );

    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    println!("Shutting down: waiting for running jobs to finish...");
    listener.abort();
    service.shutdown().await;
    let _ = std::fs::remove_file(socket_path);
    tracing::info!(jobs = service.registry().len(), "serve stopped");
    Ok(())
}
