//! Destination directory and streaming file writes.
//!
//! The destination file is created on the first body chunk, so a response
//! that never delivers a body leaves no file behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create `dir` (and parents) if absent.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Size of the file at `path`, or `None` if it does not exist.
pub fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}

/// Writes a body to `path` as chunks arrive, truncating any previous file on
/// the first chunk.
pub struct StreamingFile {
    path: PathBuf,
    file: Option<File>,
    written: u64,
}

impl StreamingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            written: 0,
        }
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let file = match self.file.take() {
            Some(f) => f,
            None => File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?,
        };
        self.file.insert(file).write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Flush and close. No-op if nothing was written.
    pub fn finish(mut self) -> io::Result<u64> {
        if let Some(mut f) = self.file.take() {
            f.flush()?;
        }
        Ok(self.written)
    }
}
