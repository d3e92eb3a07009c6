//! CLI for the batchdl batch downloader.

mod commands;
pub(crate) mod control_socket;

use anyhow::Result;
use batchdl_core::config::{self, BatchConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use commands::{run_fetch, run_poll, run_serve, run_submit};

/// Top-level CLI for the batchdl downloader.
#[derive(Debug, Parser)]
#[command(name = "batchdl")]
#[command(about = "batchdl: fetch batches of URLs with bounded parallelism", long_about = None)]
pub struct Cli {
    /// Maximum concurrent fetches (overrides config).
    #[arg(long, global = true, value_name = "N")]
    pub workers: Option<usize>,

    /// Directory to save files into (overrides config).
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a newline-separated URL list in this process and report progress.
    Fetch {
        /// File with one URL per line, or `-` for stdin.
        input: String,
        /// Progress poll interval in milliseconds.
        #[arg(long, default_value = "500", value_name = "MS")]
        interval_ms: u64,
    },

    /// Run the downloader service behind a local control socket.
    Serve {
        /// Control socket path (default: XDG state dir).
        #[arg(long)]
        socket: Option<PathBuf>,
    },

    /// Submit a URL list to a running `serve` and print the job id.
    Submit {
        /// File with one URL per line, or `-` for stdin.
        input: String,
        /// Control socket path (default: XDG state dir).
        #[arg(long)]
        socket: Option<PathBuf>,
    },

    /// Print the current snapshot of a job from a running `serve`.
    Poll {
        /// Job identifier returned by `submit`.
        id: String,
        /// Control socket path (default: XDG state dir).
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}

impl Cli {
    /// Applies `--workers` / `--download-dir` on top of the loaded config.
    pub fn apply_overrides(&self, mut cfg: BatchConfig) -> BatchConfig {
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(ref dir) = self.download_dir {
            cfg.download_dir = dir.clone();
        }
        cfg
    }

    /// Runs the parsed command. Returns false when `fetch` finished with failed items.
    pub async fn run_from_args() -> Result<bool> {
        let cli = Cli::parse();
        let cfg = cli.apply_overrides(config::load_or_init()?);
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { input, interval_ms } => {
                return run_fetch(&cfg, &input, Duration::from_millis(interval_ms.max(1))).await;
            }
            CliCommand::Serve { socket } => {
                run_serve(&cfg, &socket_or_default(socket)?).await?;
            }
            CliCommand::Submit { input, socket } => {
                run_submit(&socket_or_default(socket)?, &input).await?;
            }
            CliCommand::Poll { id, socket } => {
                run_poll(&socket_or_default(socket)?, &id).await?;
            }
        }
        Ok(true)
    }
}

fn socket_or_default(socket: Option<PathBuf>) -> Result<PathBuf> {
    match socket {
        Some(p) => Ok(p),
        None => config::control_socket_path(),
    }
}

#[cfg(test)]
mod tests;
