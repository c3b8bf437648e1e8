//! Error types for loading and unloading archives.

use std::path::PathBuf;

use archive_engine::EngineError;
use archive_reader::ReaderError;
use thiserror::Error;

/// Errors that abort a load or unload.
///
/// Every variant is fatal: the caller gets either a complete
/// [`LoadResult`](crate::LoadResult) or exactly one of these.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The archive directory does not exist
    #[error("Archive {archive} not found at {path:?}")]
    ArchiveNotFound { archive: String, path: PathBuf },

    /// An archive file could not be read or decoded
    #[error("Malformed archive {archive}: {source}")]
    MalformedArchive {
        archive: String,
        #[source]
        source: ReaderError,
    },

    /// Existence check, delete or create failed for an index
    #[error("Failed to prepare index {index} from archive {archive}: {source}")]
    IndexCreation {
        archive: String,
        index: String,
        #[source]
        source: EngineError,
    },

    /// Deleting an index during unload failed
    #[error("Failed to delete index {index} of archive {archive}: {source}")]
    IndexDeletion {
        archive: String,
        index: String,
        #[source]
        source: EngineError,
    },

    /// A bulk request failed as a whole
    #[error("Bulk indexing archive {archive} into {index} failed: {message}")]
    BulkIndex {
        archive: String,
        index: String,
        message: String,
    },

    /// Post-load refresh failed
    #[error("Refresh failed: {0}")]
    Refresh(#[source] EngineError),

    /// Post-load migration failed
    #[error("Migration failed: {0}")]
    Migration(#[source] EngineError),

    /// The background reader exited abnormally
    #[error("Archive reader stopped unexpectedly")]
    ReaderStopped,
}

impl LoadError {
    /// Attach the archive name to a reader error.
    pub fn reader(archive: impl Into<String>, err: ReaderError) -> Self {
        match err {
            ReaderError::NotFound(path) => LoadError::ArchiveNotFound {
                archive: archive.into(),
                path,
            },
            source => LoadError::MalformedArchive {
                archive: archive.into(),
                source,
            },
        }
    }

    pub fn index_creation(
        archive: impl Into<String>,
        index: impl Into<String>,
        source: EngineError,
    ) -> Self {
        LoadError::IndexCreation {
            archive: archive.into(),
            index: index.into(),
            source,
        }
    }

    pub fn index_deletion(
        archive: impl Into<String>,
        index: impl Into<String>,
        source: EngineError,
    ) -> Self {
        LoadError::IndexDeletion {
            archive: archive.into(),
            index: index.into(),
            source,
        }
    }

    pub fn bulk(
        archive: impl Into<String>,
        index: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LoadError::BulkIndex {
            archive: archive.into(),
            index: index.into(),
            message: message.into(),
        }
    }
}
