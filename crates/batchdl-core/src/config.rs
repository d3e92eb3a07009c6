use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from `~/.config/batchdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of fetches in flight across every job in the process.
    pub workers: usize,
    /// Directory downloaded files are written to (created on demand).
    pub download_dir: PathBuf,
    /// Connection-establishment timeout per fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Total operation timeout per fetch, in seconds.
    pub timeout_secs: u64,
    /// Maximum redirects followed per fetch.
    pub max_redirections: u32,
    /// Extension for synthesized filenames when the URL has no usable last segment.
    pub fallback_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            download_dir: PathBuf::from("downloads"),
            connect_timeout_secs: 10,
            timeout_secs: 20,
            max_redirections: 10,
            fallback_extension: "bin".to_string(),
        }
    }
}

impl BatchConfig {
    /// Worker budget, never below one.
    pub fn worker_budget(&self) -> usize {
        self.workers.max(1)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Default control socket path: `~/.local/state/batchdl/control.sock`.
pub fn control_socket_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.place_state_file("control.sock")?)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<BatchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: BatchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}
