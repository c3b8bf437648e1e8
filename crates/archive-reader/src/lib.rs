//! Archive reading for the archive loader.
//!
//! Turns a directory of archive files into one ordered, lazily decoded
//! stream of [`ArchiveRecord`](archive_types::ArchiveRecord)s.
//!
//! ## Key Components
//!
//! - [`list_archive_files`]: stable listing of an archive directory
//! - [`Compression`]: gzip detection by file signature
//! - [`RecordReader`]: streaming decoder for one file
//! - [`prioritize`]: moves index metadata files ahead of document files
//! - [`ConcatRecords`]: chains per-file readers, one open file at a time
//! - [`spawn_record_stream`]: runs the reader on a blocking thread behind a
//!   bounded channel
//! - [`ArchiveWriter`]: writes files the reader can decode
//!
//! ## Example
//!
//! ```ignore
//! use archive_reader::{list_archive_files, prioritize, spawn_record_stream, ConcatRecords};
//!
//! let files = prioritize(list_archive_files(&dir)?);
//! let mut stream = spawn_record_stream(ConcatRecords::from_files(files), 256);
//! while let Some(record) = stream.recv().await {
//!     let record = record?;
//!     // ...
//! }
//! ```

pub mod concat;
pub mod error;
pub mod files;
pub mod priority;
pub mod records;
pub mod stream;
pub mod writer;

pub use concat::{ConcatRecords, RecordIter, RecordResult, RecordSource};
pub use error::ReaderError;
pub use files::{list_archive_files, list_archives, open_decompressed, ArchiveFile, Compression};
pub use priority::{is_metadata_file, prioritize};
pub use records::{open_records, probe_first_is_index, RecordReader};
pub use stream::{spawn_record_stream, RecordStream};
pub use writer::{write_archive_file, ArchiveWriter};
