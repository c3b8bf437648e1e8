//! Load action: replay an archive into the engine.

use std::sync::Arc;

use tracing::info;

use archive_engine::{EngineClient, Migrator};

use crate::create_index::IndexCreationStage;
use crate::error::LoadError;
use crate::index_docs::DocumentIndexingStage;
use crate::pipeline::Pipeline;
use crate::reconcile::reconcile;
use crate::request::LoadRequest;
use crate::stats::LoadResult;

/// Load an archive.
///
/// Creates (or skips, or replaces) every index the archive describes,
/// writes its documents, refreshes what was loaded and triggers the
/// internal index migration when needed. Nothing is retried; on error
/// the indices already written stay as they are.
pub async fn load(
    request: &LoadRequest,
    client: Arc<dyn EngineClient>,
    migrator: Arc<dyn Migrator>,
) -> Result<LoadResult, LoadError> {
    info!(
        archive = %request.name,
        skip_existing = request.skip_existing,
        batch_size = request.batch_size,
        "Loading archive"
    );

    let mut pipeline = Pipeline::new()
        .with_stage(IndexCreationStage::new(
            client.clone(),
            &request.name,
            request.skip_existing,
        ))
        .with_stage(
            DocumentIndexingStage::new(client.clone(), &request.name, request.batch_size)
                .with_action(request.bulk_action()),
        );

    let ledger = pipeline.replay(request).await?;
    let result = ledger.snapshot();

    let outcome = reconcile(
        &result,
        client.as_ref(),
        migrator.as_ref(),
        &request.internal_index_prefix,
    )
    .await?;

    info!(
        archive = %request.name,
        indices = result.len(),
        indexed = result.total_indexed(),
        archived = result.total_archived(),
        failed = result.total_failed(),
        migrated = outcome.migrated,
        "Archive loaded"
    );
    Ok(result)
}
