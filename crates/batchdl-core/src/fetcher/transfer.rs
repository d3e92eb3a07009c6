//! libcurl-backed fetcher: one Easy handle per item, body streamed to disk.

use std::cell::Cell;
use std::io;
use std::str;

use super::{FetchError, FetchOutcome, FetchSettings, Fetcher, SavedFile};
use crate::storage::{self, StreamingFile};
use crate::url_model;

/// Fetcher using a blocking curl Easy transfer per call.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    settings: FetchSettings,
}

impl CurlFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    /// Downloads `url` into the download directory.
    ///
    /// Only the body of a final 2xx response is written; bodies of redirects
    /// and error responses are discarded.
    pub fn download(&self, url: &str) -> Result<SavedFile, FetchError> {
        let filename = url_model::derive_filename(url, &self.settings.fallback_extension);
        storage::ensure_dir(&self.settings.download_dir)?;
        let path = self.settings.download_dir.join(&filename);

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.settings.max_redirections)?;
        easy.connect_timeout(self.settings.connect_timeout)?;
        easy.timeout(self.settings.timeout)?;

        // Status of the latest response seen; updated per hop when redirects are followed.
        let status = Cell::new(None::<u32>);
        let mut sink = StreamingFile::new(&path);
        let mut write_err: Option<io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(Some(code));
                }
                true
            })?;
            transfer.write_function(|data| {
                if !status.get().is_some_and(is_success) {
                    return Ok(data.len());
                }
                match sink.write_chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchError::Storage(e));
        }
        performed?;
        let bytes = sink.finish()?;

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(FetchError::Http(code));
        }
        // A stale file from an earlier fetch must not count: this transfer has to write bytes.
        match storage::file_size(&path) {
            Some(size) if size > 0 && bytes > 0 => {
                tracing::debug!(url, file = %path.display(), bytes, "fetch saved");
                Ok(SavedFile {
                    filename,
                    path,
                    bytes: size,
                })
            }
            _ => Err(FetchError::Empty(code)),
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        let res = self.download(url);
        if let Err(ref e) = res {
            tracing::warn!(url, status = ?e.status(), timeout = e.is_timeout(), "fetch failed: {}", e);
            if e.is_timeout() {
                return FetchOutcome::failed(format!("timed out: {}", e));
            }
        }
        FetchOutcome::from(res)
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Parses `HTTP/1.1 404 Not Found` (or `HTTP/2 200`) into the status code.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
