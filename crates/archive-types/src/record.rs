//! Archive record types.
//!
//! An archive file is a sequence of records. Each record is either the
//! metadata needed to create an index, or one document destined for an
//! index. On disk a record looks like:
//!
//! ```json
//! {
//!   "type": "index",
//!   "value": { "index": "logs", "settings": {}, "mappings": {} }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata for creating one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Target index name
    pub index: String,

    /// Index settings (shards, analysis, ...)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub settings: Value,

    /// Field mappings
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub mappings: Value,

    /// Aliases to attach on creation
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub aliases: Value,
}

impl IndexRecord {
    /// Create a metadata record with empty settings and mappings.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            settings: Value::Null,
            mappings: Value::Null,
            aliases: Value::Null,
        }
    }

    /// Set the index settings.
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    /// Set the field mappings.
    pub fn with_mappings(mut self, mappings: Value) -> Self {
        self.mappings = mappings;
        self
    }

    /// Set the aliases.
    pub fn with_aliases(mut self, aliases: Value) -> Self {
        self.aliases = aliases;
        self
    }

    /// Body for a create-index request.
    ///
    /// Only the parts present in the archive are included.
    pub fn create_body(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in [
            ("settings", &self.settings),
            ("mappings", &self.mappings),
            ("aliases", &self.aliases),
        ] {
            if !value.is_null() {
                body.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(body)
    }
}

/// One document destined for an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRecord {
    /// Target index name
    pub index: String,

    /// Document id; the engine assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Document body
    pub source: Value,

    /// Legacy mapping type
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub doc_type: Option<String>,

    /// Shard routing key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

impl DocRecord {
    /// Create a document record.
    pub fn new(index: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            id: None,
            source,
            doc_type: None,
            routing: None,
        }
    }

    /// Set the document id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the routing key.
    pub fn with_routing(mut self, routing: impl Into<String>) -> Self {
        self.routing = Some(routing.into());
        self
    }

    /// Set the legacy mapping type.
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

/// A single archive record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArchiveRecord {
    /// Index metadata
    Index(IndexRecord),
    /// A document
    Doc(DocRecord),
}

impl ArchiveRecord {
    /// Name of the index this record targets.
    pub fn index(&self) -> &str {
        match self {
            ArchiveRecord::Index(record) => &record.index,
            ArchiveRecord::Doc(record) => &record.index,
        }
    }

    /// Whether this is an index metadata record.
    pub fn is_index(&self) -> bool {
        matches!(self, ArchiveRecord::Index(_))
    }
}

impl From<IndexRecord> for ArchiveRecord {
    fn from(record: IndexRecord) -> Self {
        ArchiveRecord::Index(record)
    }
}

impl From<DocRecord> for ArchiveRecord {
    fn from(record: DocRecord) -> Self {
        ArchiveRecord::Doc(record)
    }
}
