//! In-memory engine and migrator for testing.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{BulkAction, BulkItem, BulkOperation, BulkResponse, EngineClient, Migrator};
use crate::error::EngineError;

/// A call made against [`MockEngine`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    IndexExists(String),
    CreateIndex(String),
    DeleteIndex(String),
    /// Bulk request with this many operations
    Bulk(usize),
    Refresh(Vec<String>),
}

#[derive(Debug, Default)]
struct MockIndex {
    body: Value,
    docs: BTreeMap<String, Value>,
}

#[derive(Debug, Default)]
struct MockState {
    indices: BTreeMap<String, MockIndex>,
    /// alias -> concrete indices
    aliases: BTreeMap<String, Vec<String>>,
    calls: Vec<EngineCall>,
    bulk_requests: usize,
    next_id: usize,
    fail_bulk_on: Option<usize>,
    fail_create: HashSet<String>,
    fail_exists: HashSet<String>,
    fail_refresh: bool,
    rejected_ids: HashSet<String>,
}

impl MockState {
    fn resolve(&self, name: &str) -> Vec<String> {
        if let Some(concrete) = self.aliases.get(name) {
            return concrete.clone();
        }
        if self.indices.contains_key(name) {
            return vec![name.to_string()];
        }
        Vec::new()
    }
}

/// Engine that keeps indices and documents in memory.
///
/// Records every call and supports failure injection, so pipeline
/// behaviour can be asserted without a running engine.
#[derive(Debug, Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing index.
    pub fn with_index(self, index: impl Into<String>) -> Self {
        self.lock().indices.insert(index.into(), MockIndex::default());
        self
    }

    /// Start with an alias pointing at existing indices.
    pub fn with_alias(self, alias: impl Into<String>, concrete: &[&str]) -> Self {
        {
            let mut state = self.lock();
            for name in concrete {
                state.indices.entry(name.to_string()).or_default();
            }
            state
                .aliases
                .insert(alias.into(), concrete.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    /// Fail the `n`th bulk request (1-based) as a whole.
    pub fn fail_bulk_on(self, n: usize) -> Self {
        self.lock().fail_bulk_on = Some(n);
        self
    }

    /// Reject any document with this id.
    pub fn reject_doc(self, id: impl Into<String>) -> Self {
        self.lock().rejected_ids.insert(id.into());
        self
    }

    /// Fail index creation for this index.
    pub fn fail_create(self, index: impl Into<String>) -> Self {
        self.lock().fail_create.insert(index.into());
        self
    }

    /// Fail the existence check for this index.
    pub fn fail_exists(self, index: impl Into<String>) -> Self {
        self.lock().fail_exists.insert(index.into());
        self
    }

    /// Fail every refresh request.
    pub fn fail_refresh(self) -> Self {
        self.lock().fail_refresh = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    /// Number of bulk requests made.
    pub fn bulk_requests(&self) -> usize {
        self.lock().bulk_requests
    }

    /// Index lists of every refresh request.
    pub fn refreshes(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Refresh(indices) => Some(indices.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether a concrete index exists.
    pub fn has_index(&self, index: &str) -> bool {
        self.lock().indices.contains_key(index)
    }

    /// Names of all concrete indices.
    pub fn indices(&self) -> Vec<String> {
        self.lock().indices.keys().cloned().collect()
    }

    /// Number of documents stored in an index.
    pub fn doc_count(&self, index: &str) -> usize {
        self.lock()
            .indices
            .get(index)
            .map(|i| i.docs.len())
            .unwrap_or(0)
    }

    /// A stored document, by id.
    pub fn doc(&self, index: &str, id: &str) -> Option<Value> {
        self.lock()
            .indices
            .get(index)
            .and_then(|i| i.docs.get(id).cloned())
    }

    /// The body an index was created with.
    pub fn index_body(&self, index: &str) -> Option<Value> {
        self.lock().indices.get(index).map(|i| i.body.clone())
    }
}

#[async_trait]
impl EngineClient for MockEngine {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        let mut state = self.lock();
        state.calls.push(EngineCall::IndexExists(index.to_string()));
        if state.fail_exists.contains(index) {
            return Err(EngineError::Http("connection refused".to_string()));
        }
        Ok(!state.resolve(index).is_empty())
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.calls.push(EngineCall::CreateIndex(index.to_string()));
        if state.fail_create.contains(index) {
            return Err(EngineError::Status {
                status: 400,
                body: "illegal_argument_exception".to_string(),
            });
        }
        if !state.resolve(index).is_empty() {
            return Err(EngineError::Status {
                status: 400,
                body: format!("resource_already_exists_exception: index [{index}] already exists"),
            });
        }

        state.indices.insert(
            index.to_string(),
            MockIndex {
                body: body.clone(),
                docs: BTreeMap::new(),
            },
        );
        if let Some(Value::Object(aliases)) = body.get("aliases") {
            for alias in aliases.keys() {
                state
                    .aliases
                    .entry(alias.clone())
                    .or_default()
                    .push(index.to_string());
            }
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<Vec<String>, EngineError> {
        let mut state = self.lock();
        state.calls.push(EngineCall::DeleteIndex(index.to_string()));

        let concrete = state.resolve(index);
        for name in &concrete {
            state.indices.remove(name);
        }
        for targets in state.aliases.values_mut() {
            targets.retain(|t| !concrete.contains(t));
        }
        state.aliases.retain(|_, targets| !targets.is_empty());
        Ok(concrete)
    }

    async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse, EngineError> {
        let mut state = self.lock();
        state.calls.push(EngineCall::Bulk(operations.len()));
        state.bulk_requests += 1;
        if state.fail_bulk_on == Some(state.bulk_requests) {
            return Err(EngineError::Status {
                status: 500,
                body: "bulk request failed".to_string(),
            });
        }

        let mut items = Vec::with_capacity(operations.len());
        for op in operations {
            let id = match &op.doc.id {
                Some(id) => id.clone(),
                None => {
                    state.next_id += 1;
                    format!("auto-{}", state.next_id)
                }
            };

            let mut item = BulkItem {
                index: op.doc.index.clone(),
                id: Some(id.clone()),
                status: 201,
                error: None,
            };

            if state.rejected_ids.contains(&id) {
                item.status = 400;
                item.error = Some("mapper_parsing_exception: failed to parse".to_string());
                items.push(item);
                continue;
            }

            // Writes to a missing index create it, as the engine does
            let target = state
                .resolve(&op.doc.index)
                .into_iter()
                .next()
                .unwrap_or_else(|| op.doc.index.clone());
            let stored = state.indices.entry(target).or_default();

            if op.action == BulkAction::Create && stored.docs.contains_key(&id) {
                item.status = 409;
                item.error = Some(format!(
                    "version_conflict_engine_exception: [{id}]: document already exists"
                ));
            } else if stored.docs.insert(id, op.doc.source.clone()).is_some() {
                item.status = 200;
            }
            items.push(item);
        }

        Ok(BulkResponse { items })
    }

    async fn refresh(&self, indices: &[String]) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.calls.push(EngineCall::Refresh(indices.to_vec()));
        if state.fail_refresh {
            return Err(EngineError::Status {
                status: 503,
                body: "cluster_block_exception".to_string(),
            });
        }
        Ok(())
    }
}

/// Migrator that counts invocations.
#[derive(Debug, Default)]
pub struct MockMigrator {
    calls: AtomicUsize,
    fail: bool,
}

impl MockMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a migrator whose every call fails.
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of times `migrate` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Migrator for MockMigrator {
    async fn migrate(&self) -> Result<(), EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Status {
                status: 500,
                body: "migration failed".to_string(),
            });
        }
        Ok(())
    }
}
