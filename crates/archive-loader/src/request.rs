//! Load request parameters.

use std::path::{Path, PathBuf};

use archive_engine::BulkAction;
use archive_types::{
    Settings, DEFAULT_BATCH_SIZE, DEFAULT_CHANNEL_CAPACITY, DEFAULT_INTERNAL_INDEX_PREFIX,
};

/// Parameters of one load or unload invocation.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Archive name; the files live in `<data_dir>/<name>/`
    pub name: String,
    /// Directory holding all archives
    pub data_dir: PathBuf,
    /// Leave indices that already exist untouched
    pub skip_existing: bool,
    /// Write documents with `create` instead of `index`
    pub use_create: bool,
    /// Documents per bulk request
    pub batch_size: usize,
    /// Records buffered between the reader and the pipeline
    pub channel_capacity: usize,
    /// Name prefix of the platform's internal indices
    pub internal_index_prefix: String,
}

impl LoadRequest {
    /// Create a request with default tuning.
    pub fn new(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
            skip_existing: false,
            use_create: false,
            batch_size: DEFAULT_BATCH_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            internal_index_prefix: DEFAULT_INTERNAL_INDEX_PREFIX.to_string(),
        }
    }

    /// Create a request tuned from loaded settings.
    pub fn from_settings(name: impl Into<String>, settings: &Settings) -> Self {
        Self::new(name, settings.expanded_data_dir())
            .with_batch_size(settings.batch_size)
            .with_channel_capacity(settings.channel_capacity)
            .with_internal_index_prefix(settings.internal_index_prefix.clone())
    }

    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn with_use_create(mut self, use_create: bool) -> Self {
        self.use_create = use_create;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_internal_index_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_index_prefix = prefix.into();
        self
    }

    /// Directory holding this archive's files.
    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir.join(&self.name)
    }

    /// Bulk action for document writes.
    pub fn bulk_action(&self) -> BulkAction {
        if self.use_create {
            BulkAction::Create
        } else {
            BulkAction::Index
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = LoadRequest::new("logs", "/data");
        assert_eq!(request.archive_dir(), PathBuf::from("/data/logs"));
        assert_eq!(request.batch_size, 500);
        assert_eq!(request.internal_index_prefix, ".kibana");
        assert!(!request.skip_existing);
        assert_eq!(request.bulk_action(), BulkAction::Index);
    }

    #[test]
    fn test_builder() {
        let request = LoadRequest::new("logs", "/data")
            .with_skip_existing(true)
            .with_use_create(true)
            .with_batch_size(10)
            .with_channel_capacity(3)
            .with_internal_index_prefix(".internal");

        assert!(request.skip_existing);
        assert_eq!(request.bulk_action(), BulkAction::Create);
        assert_eq!(request.batch_size, 10);
        assert_eq!(request.channel_capacity, 3);
        assert_eq!(request.internal_index_prefix, ".internal");
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            data_dir: "/srv/archives".to_string(),
            batch_size: 42,
            ..Default::default()
        };
        let request = LoadRequest::from_settings("logs", &settings);
        assert_eq!(request.archive_dir(), PathBuf::from("/srv/archives/logs"));
        assert_eq!(request.batch_size, 42);
    }
}
