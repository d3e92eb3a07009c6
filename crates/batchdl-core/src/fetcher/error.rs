//! Per-item fetch failure.

use thiserror::Error;

/// Why a single fetch failed. Always recorded on the item, never escalated.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connection refused, timeout, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// 2xx response but no bytes reached the destination file.
    #[error("empty response (HTTP {0})")]
    Empty(u32),
    /// Creating the download directory or writing the file failed.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl FetchError {
    /// Status code of the final response, when one was received.
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::Http(code) | FetchError::Empty(code) => Some(*code),
            FetchError::Transport(_) | FetchError::Storage(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_operation_timedout())
    }
}
