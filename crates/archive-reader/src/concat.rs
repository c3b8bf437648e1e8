//! Concatenation of per-file record sequences.
//!
//! Each file contributes a lazily-opened source. Sources are opened one at
//! a time, only after the previous one has been drained and dropped, so at
//! most one archive file is open at any moment.

use std::collections::VecDeque;

use tracing::{debug, warn};

use archive_types::ArchiveRecord;

use crate::error::ReaderError;
use crate::files::ArchiveFile;
use crate::records::open_records;

/// One decoded record or the error that ended decoding.
pub type RecordResult = Result<ArchiveRecord, ReaderError>;

/// A boxed per-file record sequence.
pub type RecordIter = Box<dyn Iterator<Item = RecordResult> + Send>;

/// Factory that opens one record sequence when its turn comes.
pub type RecordSource = Box<dyn FnOnce() -> Result<RecordIter, ReaderError> + Send>;

/// Yields all records of source 1, then source 2, and so on.
///
/// The first error, whether from opening a source or from one of its
/// records, is yielded once. Remaining sources are discarded and the
/// sequence ends.
pub struct ConcatRecords {
    pending: VecDeque<RecordSource>,
    current: Option<RecordIter>,
    opened: usize,
    halted: bool,
}

impl ConcatRecords {
    /// Create from an ordered list of sources.
    pub fn new(sources: impl IntoIterator<Item = RecordSource>) -> Self {
        Self {
            pending: sources.into_iter().collect(),
            current: None,
            opened: 0,
            halted: false,
        }
    }

    /// One source per archive file, in the given order.
    pub fn from_files(files: Vec<ArchiveFile>) -> Self {
        Self::new(files.into_iter().map(|file| {
            let source: RecordSource = Box::new(move || {
                debug!(file = %file.name, "Reading archive file");
                let records = open_records(&file.path)?;
                Ok(Box::new(records) as RecordIter)
            });
            source
        }))
    }

    /// Number of sources opened so far.
    pub fn opened(&self) -> usize {
        self.opened
    }

    /// Number of sources not yet opened.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn halt(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                skipped_sources = self.pending.len(),
                "Stopping record stream after error"
            );
        }
        self.halted = true;
        self.current = None;
        self.pending.clear();
    }
}

impl Iterator for ConcatRecords {
    type Item = RecordResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }

        loop {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok(record)) => return Some(Ok(record)),
                    Some(Err(err)) => {
                        self.halt();
                        return Some(Err(err));
                    }
                    // Drop the drained source before opening the next one
                    None => self.current = None,
                }
            }

            let source = self.pending.pop_front()?;
            self.opened += 1;
            match source() {
                Ok(records) => self.current = Some(records),
                Err(err) => {
                    self.halt();
                    return Some(Err(err));
                }
            }
        }
    }
}
