//! # archive-types
//!
//! Shared domain types for the archive loader.
//!
//! - Records: index metadata and documents as stored in archive files
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use archive_types::{ArchiveRecord, IndexRecord};
//!
//! let record: ArchiveRecord = IndexRecord::new("logs").into();
//! assert!(record.is_index());
//! ```

pub mod config;
pub mod error;
pub mod record;

pub use config::{
    Settings, DEFAULT_BATCH_SIZE, DEFAULT_CHANNEL_CAPACITY, DEFAULT_INTERNAL_INDEX_PREFIX,
};
pub use error::ConfigError;
pub use record::{ArchiveRecord, DocRecord, IndexRecord};
