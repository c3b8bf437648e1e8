//! Document indexing stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use archive_engine::{BulkAction, BulkOperation, EngineClient};
use archive_types::ArchiveRecord;

use crate::error::LoadError;
use crate::stage::Stage;
use crate::stats::StatsLedger;

/// Bulk-writes document records into their target indices.
///
/// Documents for indices the creation stage skipped are counted as
/// archived and dropped. Everything else is buffered and written in
/// batches of `batch_size`. This stage consumes every record.
///
/// Only a failed bulk request aborts the load. Documents the engine
/// rejects are counted as failed whatever the batch size.
pub struct DocumentIndexingStage {
    client: Arc<dyn EngineClient>,
    archive: String,
    action: BulkAction,
    batch_size: usize,
    buffer: Vec<BulkOperation>,
    batches: usize,
}

impl DocumentIndexingStage {
    pub fn new(
        client: Arc<dyn EngineClient>,
        archive: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            client,
            archive: archive.into(),
            action: BulkAction::Index,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            batches: 0,
        }
    }

    /// Set the bulk action used for every document.
    pub fn with_action(mut self, action: BulkAction) -> Self {
        self.action = action;
        self
    }

    /// Number of bulk requests sent so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    async fn flush(&mut self, ledger: &mut StatsLedger) -> Result<(), LoadError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let operations = std::mem::take(&mut self.buffer);
        self.batches += 1;
        debug!(batch = self.batches, docs = operations.len(), "Writing batch");

        let response = self
            .client
            .bulk(&operations)
            .await
            .map_err(|e| {
                LoadError::bulk(&self.archive, batch_indices(&operations), e.to_string())
            })?;

        if response.items.len() != operations.len() {
            return Err(LoadError::bulk(
                &self.archive,
                batch_indices(&operations),
                format!(
                    "engine answered {} items for {} documents",
                    response.items.len(),
                    operations.len()
                ),
            ));
        }

        for (op, item) in operations.iter().zip(&response.items) {
            match &item.error {
                None => ledger.record_indexed(&op.doc.index),
                Some(error) => {
                    warn!(
                        index = %op.doc.index,
                        id = ?item.id,
                        status = item.status,
                        error = %error,
                        "Document rejected"
                    );
                    ledger.record_failed(&op.doc.index);
                }
            }
        }
        if response.has_errors() {
            warn!(
                archive = %self.archive,
                batch = self.batches,
                rejected = response.failed(),
                docs = operations.len(),
                "Batch partially rejected"
            );
        }

        self.buffer = Vec::with_capacity(self.batch_size);
        Ok(())
    }
}

/// Distinct target indices of a batch, in first-seen order.
fn batch_indices(operations: &[BulkOperation]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for op in operations {
        if !names.contains(&op.doc.index.as_str()) {
            names.push(&op.doc.index);
        }
    }
    names.join(",")
}

#[async_trait]
impl Stage for DocumentIndexingStage {
    fn name(&self) -> &str {
        "index-docs"
    }

    async fn process(
        &mut self,
        record: ArchiveRecord,
        ledger: &mut StatsLedger,
    ) -> Result<Option<ArchiveRecord>, LoadError> {
        let ArchiveRecord::Doc(doc) = record else {
            return Ok(None);
        };

        ledger.record_archived(&doc.index);
        if ledger.is_skipped(&doc.index) {
            return Ok(None);
        }

        self.buffer.push(BulkOperation::new(self.action, doc));
        if self.buffer.len() >= self.batch_size {
            self.flush(ledger).await?;
        }
        Ok(None)
    }

    async fn finish(&mut self, ledger: &mut StatsLedger) -> Result<(), LoadError> {
        self.flush(ledger).await
    }
}
