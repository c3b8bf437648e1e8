//! Per-index outcome tracking for a single load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document counters for one index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStats {
    /// Documents confirmed written by the engine
    pub indexed: u64,
    /// Documents read from the archive
    pub archived: u64,
    /// Documents the engine rejected individually
    #[serde(default)]
    pub failed: u64,
}

/// Outcome for one index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub created: bool,
    pub skipped: bool,
    pub deleted: bool,
    pub docs: DocStats,
}

/// Mutable ledger owned by one run and handed to each stage in turn.
#[derive(Debug, Default)]
pub struct StatsLedger {
    indices: BTreeMap<String, IndexStats>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for an index, if it has been seen.
    pub fn get(&self, index: &str) -> Option<&IndexStats> {
        self.indices.get(index)
    }

    /// Stats for an index, creating an empty entry on first use.
    pub fn entry(&mut self, index: &str) -> &mut IndexStats {
        self.indices.entry(index.to_string()).or_default()
    }

    pub fn mark_created(&mut self, index: &str) {
        self.entry(index).created = true;
    }

    pub fn mark_skipped(&mut self, index: &str) {
        self.entry(index).skipped = true;
    }

    pub fn mark_deleted(&mut self, index: &str) {
        self.entry(index).deleted = true;
    }

    /// Whether documents for this index must be dropped.
    pub fn is_skipped(&self, index: &str) -> bool {
        self.get(index).map(|s| s.skipped).unwrap_or(false)
    }

    pub fn record_archived(&mut self, index: &str) {
        self.entry(index).docs.archived += 1;
    }

    pub fn record_indexed(&mut self, index: &str) {
        self.entry(index).docs.indexed += 1;
    }

    pub fn record_failed(&mut self, index: &str) {
        self.entry(index).docs.failed += 1;
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Freeze the ledger into a result.
    pub fn snapshot(&self) -> LoadResult {
        LoadResult {
            indices: self.indices.clone(),
        }
    }
}

/// Final per-index report of a load or unload, ordered by index name.
///
/// Serializes as `{"<index>": {"created": .., "skipped": .., "deleted": ..,
/// "docs": {"indexed": .., "archived": .., "failed": ..}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadResult {
    indices: BTreeMap<String, IndexStats>,
}

impl LoadResult {
    pub fn get(&self, index: &str) -> Option<&IndexStats> {
        self.indices.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexStats)> {
        self.indices.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Names of every affected index, sorted.
    pub fn index_names(&self) -> Vec<String> {
        self.indices.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices to refresh after a load: every index not marked deleted.
    pub fn refresh_targets(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, stats)| !stats.deleted)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Whether any index name starts with `prefix`.
    pub fn touches_prefix(&self, prefix: &str) -> bool {
        self.indices.keys().any(|name| name.starts_with(prefix))
    }

    pub fn total_indexed(&self) -> u64 {
        self.indices.values().map(|s| s.docs.indexed).sum()
    }

    pub fn total_archived(&self) -> u64 {
        self.indices.values().map(|s| s.docs.archived).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.indices.values().map(|s| s.docs.failed).sum()
    }
}
