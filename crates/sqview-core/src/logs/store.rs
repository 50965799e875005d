//! Whole-file line store.
//!
//! A `LineStore` is loaded once from a log file and is immutable
//! afterwards; reloading a log means building a new store and swapping it
//! in wholesale. Line terminators (`\n` and `\r\n`) are stripped at load
//! and every consumer assumes terminator-free lines.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure kinds for [`LineStore::load`].
///
/// Viewport operations never fail; these are the only error paths in the
/// log engine.
#[derive(Debug, Error)]
pub enum LogError {
    /// The path does not exist or is not a regular file.
    #[error("log file not found: {}", .0.display())]
    SourceUnavailable(PathBuf),
    /// The file could not be read.
    #[error("failed to read log file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file contents are not valid UTF-8.
    #[error("log file is not valid UTF-8: {}", .0.display())]
    Decode(PathBuf),
}

/// An ordered, immutable sequence of log lines read from one file.
#[derive(Debug)]
pub struct LineStore {
    path: PathBuf,
    lines: Vec<String>,
}

impl LineStore {
    /// Reads the whole file in one pass and splits it into lines.
    ///
    /// Each call re-reads the file; there is no caching across loads.
    pub fn load(path: &Path) -> Result<Self, LogError> {
        if !path.is_file() {
            return Err(LogError::SourceUnavailable(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| LogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text =
            String::from_utf8(bytes).map_err(|_| LogError::Decode(path.to_path_buf()))?;
        let lines = text.lines().map(str::to_owned).collect();
        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    /// The file this store was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines `[start, end)`, clamped to the file bounds.
    ///
    /// `start >= end` yields an empty slice; running off either file edge
    /// is a normal condition, never an error.
    pub fn slice(&self, start: usize, end: usize) -> &[String] {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        &self.lines[start..end]
    }

    /// Total line count.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
