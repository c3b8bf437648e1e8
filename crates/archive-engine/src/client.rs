//! Engine client and migration traits plus bulk request types.

use async_trait::async_trait;
use serde_json::Value;

use archive_types::DocRecord;

use crate::error::EngineError;

/// Bulk action used to write a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkAction {
    /// Insert or overwrite
    #[default]
    Index,
    /// Insert only; an existing id is rejected
    Create,
}

impl BulkAction {
    /// Action name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Create => "create",
        }
    }
}

impl std::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document write inside a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    pub action: BulkAction,
    pub doc: DocRecord,
}

impl BulkOperation {
    pub fn new(action: BulkAction, doc: DocRecord) -> Self {
        Self { action, doc }
    }
}

/// Outcome of one document in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItem {
    /// Index the document was written to
    pub index: String,
    /// Document id, as assigned or echoed by the engine
    pub id: Option<String>,
    /// Per-item HTTP status
    pub status: u16,
    /// Rejection reason, when the item failed
    pub error: Option<String>,
}

impl BulkItem {
    /// Whether the document was written.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-document results of a bulk request, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    /// Number of rejected documents.
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|item| !item.is_ok()).count()
    }

    /// Whether any document was rejected.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|item| !item.is_ok())
    }
}

/// Operations the loader needs from the destination search engine.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Check whether an index (or alias) exists.
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    /// Create an index with a `{settings, mappings, aliases}` body.
    async fn create_index(&self, index: &str, body: &Value) -> Result<(), EngineError>;

    /// Delete an index.
    ///
    /// When `index` is an alias, the concrete indices behind it are
    /// deleted. Returns the names of the deleted indices.
    async fn delete_index(&self, index: &str) -> Result<Vec<String>, EngineError>;

    /// Write many documents in one request.
    ///
    /// `Err` means the request as a whole failed. Per-document rejections
    /// are reported in the response.
    async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse, EngineError>;

    /// Make recent writes to the given indices visible to search.
    ///
    /// An empty list is a no-op.
    async fn refresh(&self, indices: &[String]) -> Result<(), EngineError>;
}

/// Trigger for migrating the platform's internal metadata indices.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Run the migration once.
    async fn migrate(&self) -> Result<(), EngineError>;
}
