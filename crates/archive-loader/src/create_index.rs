//! Index creation stage.
//!
//! Decides, for each index the archive describes, whether to create it,
//! leave it alone, or delete and recreate it.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use archive_engine::EngineClient;
use archive_types::{ArchiveRecord, IndexRecord};

use crate::error::LoadError;
use crate::stage::Stage;
use crate::stats::StatsLedger;

/// Prepares target indices from index metadata records.
///
/// The first metadata record for an index decides its fate; later ones
/// for the same index are ignored. Every record is passed on unchanged.
pub struct IndexCreationStage {
    client: Arc<dyn EngineClient>,
    archive: String,
    skip_existing: bool,
    seen: HashSet<String>,
}

impl IndexCreationStage {
    pub fn new(
        client: Arc<dyn EngineClient>,
        archive: impl Into<String>,
        skip_existing: bool,
    ) -> Self {
        Self {
            client,
            archive: archive.into(),
            skip_existing,
            seen: HashSet::new(),
        }
    }

    async fn prepare(&self, record: &IndexRecord, ledger: &mut StatsLedger) -> Result<(), LoadError> {
        let index = record.index.as_str();
        let wrap = |e| LoadError::index_creation(&self.archive, index, e);

        let exists = self.client.index_exists(index).await.map_err(wrap)?;

        if exists && self.skip_existing {
            info!(index = %index, "Skipping existing index");
            ledger.mark_skipped(index);
            return Ok(());
        }

        if exists {
            let deleted = self.client.delete_index(index).await.map_err(wrap)?;
            info!(index = %index, deleted = ?deleted, "Deleted existing index");
            ledger.mark_deleted(index);
        }

        self.client
            .create_index(index, &record.create_body())
            .await
            .map_err(wrap)?;
        info!(index = %index, "Created index");
        ledger.mark_created(index);
        Ok(())
    }
}

#[async_trait]
impl Stage for IndexCreationStage {
    fn name(&self) -> &str {
        "create-index"
    }

    async fn process(
        &mut self,
        record: ArchiveRecord,
        ledger: &mut StatsLedger,
    ) -> Result<Option<ArchiveRecord>, LoadError> {
        if let ArchiveRecord::Index(meta) = &record {
            if self.seen.insert(meta.index.clone()) {
                self.prepare(meta, ledger).await?;
            } else {
                debug!(index = %meta.index, "Ignoring repeated index metadata");
            }
        }
        Ok(Some(record))
    }
}
