//! `batchdl submit <file>` – send a URL list to a running server.

use anyhow::Result;
use std::path::Path;

use super::read_url_text;
use crate::cli::control_socket;

pub async fn run_submit(socket_path: &Path, input: &str) -> Result<()> {
    let text = read_url_text(input).await?;
    let id = control_socket::send_submit(socket_path, &text).await?;
    println!("{id}");
    Ok(())
}
