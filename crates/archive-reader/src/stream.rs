//! Bridge from the blocking record reader to async consumers.
//!
//! File reads and gzip decoding are blocking, so the concatenated record
//! sequence runs on a tokio blocking thread and hands records over a
//! bounded channel. A full channel blocks the reader, which bounds memory
//! to `capacity` records regardless of archive size.

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::concat::{ConcatRecords, RecordResult};

/// Async receiving end of a spawned record reader.
pub struct RecordStream {
    rx: mpsc::Receiver<RecordResult>,
    handle: JoinHandle<()>,
}

impl RecordStream {
    /// Receive the next record.
    ///
    /// Returns `None` once every source has been drained, or after the
    /// error that ended the stream has been received.
    pub async fn recv(&mut self) -> Option<RecordResult> {
        self.rx.recv().await
    }

    /// Stop the reader and wait until it has closed its file.
    ///
    /// Returns an error if the reader thread panicked.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        let RecordStream { rx, handle } = self;
        drop(rx);
        handle.await.inspect_err(|e| {
            warn!(error = %e, "Record reader task failed");
        })
    }
}

/// Run `records` on a blocking thread, delivering items through a
/// channel that holds at most `capacity` records.
///
/// The reader stops after delivering an error, or as soon as the
/// receiver is dropped.
pub fn spawn_record_stream(records: ConcatRecords, capacity: usize) -> RecordStream {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        let mut delivered = 0usize;
        for item in records {
            let failed = item.is_err();
            if tx.blocking_send(item).is_err() {
                debug!(delivered, "Record consumer closed, stopping reader");
                return;
            }
            if failed {
                return;
            }
            delivered += 1;
        }
        debug!(delivered, "Record reader finished");
    });

    RecordStream { rx, handle }
}
