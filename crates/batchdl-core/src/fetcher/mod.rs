//! Single URL → local file transfer.
//!
//! A fetch never fails past this boundary: every error is folded into a
//! [`FetchOutcome`] whose message is stored verbatim as the item's result.

mod transfer;
mod error;

pub use transfer::CurlFetcher;
pub use error::FetchError;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::BatchConfig;

/// Per-fetch transfer settings.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub download_dir: PathBuf,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_redirections: u32,
    pub fallback_extension: String,
}

impl From<&BatchConfig> for FetchSettings {
    fn from(cfg: &BatchConfig) -> Self {
        Self {
            download_dir: cfg.download_dir.clone(),
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
            max_redirections: cfg.max_redirections,
            fallback_extension: cfg.fallback_extension.clone(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

/// A file written by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of one fetch as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub succeeded: bool,
    pub message: String,
}

impl FetchOutcome {
    pub fn saved(file: &SavedFile) -> Self {
        Self {
            succeeded: true,
            message: format!("saved {} ({} bytes)", file.filename, file.bytes),
        }
    }

    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            succeeded: false,
            message: format!("failed: {}", reason),
        }
    }
}

impl From<Result<SavedFile, FetchError>> for FetchOutcome {
    fn from(res: Result<SavedFile, FetchError>) -> Self {
        match res {
            Ok(file) => FetchOutcome::saved(&file),
            Err(e) => FetchOutcome::failed(e),
        }
    }
}

/// Transfers one URL to local storage. Blocking; the scheduler runs it on
/// the blocking pool.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> FetchOutcome;
}
