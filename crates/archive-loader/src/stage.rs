//! Pipeline stage trait.

use async_trait::async_trait;

use archive_types::ArchiveRecord;

use crate::error::LoadError;
use crate::stats::StatsLedger;

/// One step of the record pipeline.
///
/// Stages see records one at a time, in archive order. Returning
/// `Some(record)` forwards it to the next stage; `None` consumes it.
#[async_trait]
pub trait Stage: Send {
    /// Get the name of this stage for logging.
    fn name(&self) -> &str;

    /// Handle one record.
    async fn process(
        &mut self,
        record: ArchiveRecord,
        ledger: &mut StatsLedger,
    ) -> Result<Option<ArchiveRecord>, LoadError>;

    /// Called once after the input ends, to flush buffered work.
    async fn finish(&mut self, _ledger: &mut StatsLedger) -> Result<(), LoadError> {
        Ok(())
    }
}
