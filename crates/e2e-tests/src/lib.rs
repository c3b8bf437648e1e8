//! End-to-end test infrastructure for the archive loader.
//!
//! Provides a shared TestHarness that writes archives to a temp data
//! directory and loads them into an in-memory engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use archive_engine::{MockEngine, MockMigrator};
use archive_loader::{load, unload, LoadError, LoadRequest, LoadResult};
use archive_reader::{write_archive_file, Compression};
use archive_types::{ArchiveRecord, DocRecord, IndexRecord};

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Directory holding all archives
    pub data_dir: PathBuf,
    /// Destination engine
    pub engine: Arc<MockEngine>,
    /// Migration trigger
    pub migrator: Arc<MockMigrator>,
}

impl TestHarness {
    /// Create a harness with an empty engine.
    pub fn new() -> Self {
        Self::with_engine(MockEngine::new())
    }

    /// Create a harness around a preconfigured engine.
    pub fn with_engine(engine: MockEngine) -> Self {
        Self::with_parts(engine, MockMigrator::new())
    }

    pub fn with_parts(engine: MockEngine, migrator: MockMigrator) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("archives");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            _temp_dir: temp_dir,
            data_dir,
            engine: Arc::new(engine),
            migrator: Arc::new(migrator),
        }
    }

    /// Write one archive file and return its path.
    pub fn write_file(
        &self,
        archive: &str,
        file: &str,
        compression: Compression,
        records: &[ArchiveRecord],
    ) -> PathBuf {
        let dir = self.data_dir.join(archive);
        std::fs::create_dir_all(&dir).expect("Failed to create archive dir");
        let path = dir.join(file);
        write_archive_file(&path, compression, records).expect("Failed to write archive file");
        path
    }

    /// Write raw bytes as an archive file.
    pub fn write_raw(&self, archive: &str, file: &str, content: &[u8]) -> PathBuf {
        let dir = self.data_dir.join(archive);
        std::fs::create_dir_all(&dir).expect("Failed to create archive dir");
        let path = dir.join(file);
        std::fs::write(&path, content).expect("Failed to write raw file");
        path
    }

    /// Request for an archive in this harness's data directory.
    pub fn request(&self, archive: &str) -> LoadRequest {
        LoadRequest::new(archive, &self.data_dir)
    }

    pub async fn load(&self, request: &LoadRequest) -> Result<LoadResult, LoadError> {
        load(request, self.engine.clone(), self.migrator.clone()).await
    }

    pub async fn unload(&self, request: &LoadRequest) -> Result<LoadResult, LoadError> {
        unload(request, self.engine.clone()).await
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Index metadata record with a small mapping.
pub fn index_record(index: &str) -> ArchiveRecord {
    IndexRecord::new(index)
        .with_settings(json!({"number_of_shards": 1}))
        .with_mappings(json!({"properties": {"n": {"type": "long"}}}))
        .into()
}

/// `count` documents for `index` with ids `<index>-<n>`.
pub fn doc_records(index: &str, count: usize) -> Vec<ArchiveRecord> {
    (0..count)
        .map(|n| {
            DocRecord::new(index, json!({"n": n}))
                .with_id(format!("{index}-{n}"))
                .into()
        })
        .collect()
}

/// Metadata for every index followed by `docs_per_index` documents each.
pub fn single_file_archive(indices: &[&str], docs_per_index: usize) -> Vec<ArchiveRecord> {
    let mut records: Vec<ArchiveRecord> = indices.iter().map(|i| index_record(i)).collect();
    for index in indices {
        records.extend(doc_records(index, docs_per_index));
    }
    records
}
