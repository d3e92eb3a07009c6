//! `batchdl poll <id>` – print a job snapshot from a running server.

use anyhow::Result;
use std::path::Path;

use crate::cli::control_socket;

pub async fn run_poll(socket_path: &Path, job_id: &str) -> Result<()> {
    let snapshot = control_socket::send_poll(socket_path, job_id).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
