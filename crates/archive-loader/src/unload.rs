//! Unload action: remove an archive's indices from the engine.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use archive_engine::EngineClient;
use archive_types::ArchiveRecord;

use crate::error::LoadError;
use crate::pipeline::Pipeline;
use crate::request::LoadRequest;
use crate::stage::Stage;
use crate::stats::{LoadResult, StatsLedger};

/// Deletes every existing index the archive has metadata for.
///
/// Document records are consumed without effect.
pub struct IndexDeletionStage {
    client: Arc<dyn EngineClient>,
    archive: String,
    seen: HashSet<String>,
}

impl IndexDeletionStage {
    pub fn new(client: Arc<dyn EngineClient>, archive: impl Into<String>) -> Self {
        Self {
            client,
            archive: archive.into(),
            seen: HashSet::new(),
        }
    }
}

#[async_trait]
impl Stage for IndexDeletionStage {
    fn name(&self) -> &str {
        "delete-index"
    }

    async fn process(
        &mut self,
        record: ArchiveRecord,
        ledger: &mut StatsLedger,
    ) -> Result<Option<ArchiveRecord>, LoadError> {
        let ArchiveRecord::Index(meta) = record else {
            return Ok(None);
        };
        if !self.seen.insert(meta.index.clone()) {
            return Ok(None);
        }

        let index = meta.index.as_str();
        let wrap = |e| LoadError::index_deletion(&self.archive, index, e);

        if !self.client.index_exists(index).await.map_err(wrap)? {
            debug!(index = %index, "Index not present, nothing to delete");
            return Ok(None);
        }

        let deleted = self.client.delete_index(index).await.map_err(wrap)?;
        info!(index = %index, deleted = ?deleted, "Deleted index");
        ledger.mark_deleted(index);
        Ok(None)
    }
}

/// Unload an archive by deleting the indices it describes.
pub async fn unload(
    request: &LoadRequest,
    client: Arc<dyn EngineClient>,
) -> Result<LoadResult, LoadError> {
    info!(archive = %request.name, "Unloading archive");

    let mut pipeline = Pipeline::new().with_stage(IndexDeletionStage::new(client, &request.name));
    let result = pipeline.replay(request).await?.snapshot();

    info!(archive = %request.name, deleted = result.len(), "Archive unloaded");
    Ok(result)
}
