//! CLI command handlers. Each command is in its own file.

mod fetch;
mod poll;
mod serve;
mod submit;

pub use fetch::run_fetch;
pub use poll::run_poll;
pub use serve::run_serve;
pub use submit::run_submit;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

/// Reads URL text from a file, or from stdin when `input` is `-`.
pub(crate) async fn read_url_text(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("read URLs from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("read URL list {}", input))
}
