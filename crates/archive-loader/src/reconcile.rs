//! Post-load refresh and migration.

use tracing::{debug, info};

use archive_engine::{EngineClient, Migrator};

use crate::error::LoadError;
use crate::stats::LoadResult;

/// What the reconciler did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Indices included in the refresh call
    pub refreshed: Vec<String>,
    /// Whether the migration was triggered
    pub migrated: bool,
}

/// Refresh the loaded indices, then migrate internal indices if any
/// were touched.
///
/// Refresh covers every index not marked deleted, in a single call, and
/// is skipped when there is none. Migration runs at most once.
pub async fn reconcile(
    result: &LoadResult,
    client: &dyn EngineClient,
    migrator: &dyn Migrator,
    internal_prefix: &str,
) -> Result<ReconcileOutcome, LoadError> {
    let mut outcome = ReconcileOutcome {
        refreshed: result.refresh_targets(),
        migrated: false,
    };

    if outcome.refreshed.is_empty() {
        debug!("No indices to refresh");
    } else {
        client
            .refresh(&outcome.refreshed)
            .await
            .map_err(LoadError::Refresh)?;
        debug!(indices = ?outcome.refreshed, "Refreshed indices");
    }

    if !internal_prefix.is_empty() && result.touches_prefix(internal_prefix) {
        info!(prefix = %internal_prefix, "Internal indices loaded, running migration");
        migrator.migrate().await.map_err(LoadError::Migration)?;
        outcome.migrated = true;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_engine::{MockEngine, MockMigrator};

    use crate::stats::StatsLedger;

    fn result(created: &[&str], deleted: &[&str]) -> LoadResult {
        let mut ledger = StatsLedger::new();
        for index in created {
            ledger.mark_created(index);
        }
        for index in deleted {
            ledger.mark_deleted(index);
        }
        ledger.snapshot()
    }

    #[tokio::test]
    async fn test_refresh_once_and_migrate_once() {
        let engine = MockEngine::new();
        let migrator = MockMigrator::new();

        let outcome = reconcile(
            &result(&["foo", ".kibana_1", ".kibana_task_manager"], &[]),
            &engine,
            &migrator,
            ".kibana",
        )
        .await
        .unwrap();

        assert_eq!(
            engine.refreshes(),
            vec![vec![
                ".kibana_1".to_string(),
                ".kibana_task_manager".to_string(),
                "foo".to_string()
            ]]
        );
        assert!(outcome.migrated);
        assert_eq!(migrator.calls(), 1);
    }

    #[tokio::test]
    async fn test_deleted_indices_not_refreshed() {
        let engine = MockEngine::new();
        let migrator = MockMigrator::new();

        let outcome = reconcile(&result(&["foo", "bar"], &["bar"]), &engine, &migrator, ".kibana")
            .await
            .unwrap();

        assert_eq!(outcome.refreshed, vec!["foo"]);
        assert!(!outcome.migrated);
        assert_eq!(migrator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_refresh_set_is_skipped() {
        let engine = MockEngine::new();
        let migrator = MockMigrator::new();

        reconcile(&result(&[], &["gone"]), &engine, &migrator, ".kibana")
            .await
            .unwrap();
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_error() {
        let engine = MockEngine::new().fail_refresh();
        let migrator = MockMigrator::new();

        let err = reconcile(&result(&[".kibana"], &[]), &engine, &migrator, ".kibana")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Refresh(_)));
        // Migration comes after refresh
        assert_eq!(migrator.calls(), 0);
    }

    #[tokio::test]
    async fn test_migration_error() {
        let engine = MockEngine::new();
        let migrator = MockMigrator::failing();

        let err = reconcile(&result(&[".kibana"], &[]), &engine, &migrator, ".kibana")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Migration(_)));
    }
}
