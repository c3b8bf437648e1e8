//! Error types for archive reading and writing.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing archive files.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Archive directory does not exist.
    #[error("Archive directory not found: {0:?}")]
    NotFound(PathBuf),

    /// IO error while listing, opening or writing a file.
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content could not be decompressed or parsed.
    #[error("Malformed archive file {path:?} at record {record}: {message}")]
    Malformed {
        path: PathBuf,
        record: usize,
        message: String,
    },
}

impl ReaderError {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-content error.
    pub fn malformed(path: impl Into<PathBuf>, record: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            record,
            message: message.into(),
        }
    }

    /// Path of the file or directory the error relates to.
    pub fn path(&self) -> &Path {
        match self {
            ReaderError::NotFound(path) => path,
            ReaderError::Io { path, .. } => path,
            ReaderError::Malformed { path, .. } => path,
        }
    }
}
