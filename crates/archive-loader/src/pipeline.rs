//! Record pipeline connecting the archive reader to a chain of stages.
//!
//! Records are pulled from the reader one at a time and pushed through
//! every stage in order. The first error from the reader or any stage
//! stops the run; the reader is then shut down and its file closed.

use tracing::{debug, info};

use archive_reader::{list_archive_files, prioritize, spawn_record_stream, ConcatRecords, RecordStream};
use archive_types::ArchiveRecord;

use crate::error::LoadError;
use crate::request::LoadRequest;
use crate::stage::Stage;
use crate::stats::StatsLedger;

/// Ordered chain of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the end of the chain.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.add_stage(Box::new(stage));
        self
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        debug!(stage = stage.name(), "Added pipeline stage");
        self.stages.push(stage);
    }

    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Push one record through the chain.
    pub async fn push(
        &mut self,
        record: ArchiveRecord,
        ledger: &mut StatsLedger,
    ) -> Result<(), LoadError> {
        let mut current = Some(record);
        for stage in self.stages.iter_mut() {
            let Some(record) = current.take() else {
                break;
            };
            current = stage.process(record, ledger).await?;
        }
        Ok(())
    }

    /// Let every stage flush buffered work, in order.
    pub async fn finish(&mut self, ledger: &mut StatsLedger) -> Result<(), LoadError> {
        for stage in self.stages.iter_mut() {
            stage.finish(ledger).await?;
        }
        Ok(())
    }

    /// Drain `stream` through the chain, then finish every stage.
    ///
    /// Returns the number of records read.
    pub async fn run(
        &mut self,
        archive: &str,
        stream: &mut RecordStream,
        ledger: &mut StatsLedger,
    ) -> Result<usize, LoadError> {
        let mut records = 0usize;
        while let Some(item) = stream.recv().await {
            let record = item.map_err(|e| LoadError::reader(archive, e))?;
            self.push(record, ledger).await?;
            records += 1;
        }
        self.finish(ledger).await?;
        Ok(records)
    }

    /// Replay every file of the requested archive through the chain.
    ///
    /// Files holding index metadata are read first. Returns the ledger
    /// the stages filled in.
    pub async fn replay(&mut self, request: &LoadRequest) -> Result<StatsLedger, LoadError> {
        let dir = request.archive_dir();
        let listing = tokio::task::spawn_blocking(move || list_archive_files(&dir).map(prioritize))
            .await
            .map_err(|_| LoadError::ReaderStopped)?;
        let files = listing.map_err(|e| LoadError::reader(&request.name, e))?;

        info!(
            archive = %request.name,
            files = files.len(),
            "Reading archive"
        );

        let mut stream = spawn_record_stream(ConcatRecords::from_files(files), request.channel_capacity);
        let mut ledger = StatsLedger::new();

        let outcome = self.run(&request.name, &mut stream, &mut ledger).await;
        let reader = stream.shutdown().await;

        let records = outcome?;
        reader.map_err(|_| LoadError::ReaderStopped)?;

        debug!(archive = %request.name, records, "Archive drained");
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use archive_reader::Compression;
    use archive_types::{DocRecord, IndexRecord};
    use async_trait::async_trait;
    use serde_json::json;

    use crate::test_support::write_file;

    /// Records what it sees and optionally fails on a given record.
    struct Recorder {
        name: String,
        seen: Arc<Mutex<Vec<String>>>,
        fail_on: Option<usize>,
        consume: bool,
        finished: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &str, seen: Arc<Mutex<Vec<String>>>, finished: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name: name.to_string(),
                seen,
                fail_on: None,
                consume: false,
                finished,
            }
        }
    }

    #[async_trait]
    impl Stage for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn process(
            &mut self,
            record: ArchiveRecord,
            _ledger: &mut StatsLedger,
        ) -> Result<Option<ArchiveRecord>, LoadError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(format!("{}:{}", self.name, record.index()));
            if self.fail_on == Some(seen.len()) {
                return Err(LoadError::bulk("test", record.index(), "boom"));
            }
            Ok(if self.consume { None } else { Some(record) })
        }

        async fn finish(&mut self, _ledger: &mut StatsLedger) -> Result<(), LoadError> {
            self.finished.lock().unwrap().push(self.name.clone());
            Ok(())
        }
    }

    fn shared() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_push_runs_stages_in_order() {
        let seen = shared();
        let finished = shared();
        let mut pipeline = Pipeline::new()
            .with_stage(Recorder::new("first", seen.clone(), finished.clone()))
            .with_stage(Recorder::new("second", seen.clone(), finished.clone()));
        assert_eq!(pipeline.stage_names(), vec!["first", "second"]);

        let mut ledger = StatsLedger::new();
        pipeline
            .push(IndexRecord::new("a").into(), &mut ledger)
            .await
            .unwrap();
        pipeline
            .push(DocRecord::new("b", json!({})).into(), &mut ledger)
            .await
            .unwrap();
        pipeline.finish(&mut ledger).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:a", "second:a", "first:b", "second:b"]
        );
        assert_eq!(*finished.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_consumed_record_stops_chain() {
        let seen = shared();
        let finished = shared();
        let mut first = Recorder::new("first", seen.clone(), finished.clone());
        first.consume = true;
        let mut pipeline = Pipeline::new()
            .with_stage(first)
            .with_stage(Recorder::new("second", seen.clone(), finished));

        let mut ledger = StatsLedger::new();
        pipeline
            .push(IndexRecord::new("a").into(), &mut ledger)
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["first:a"]);
    }

    #[tokio::test]
    async fn test_replay_orders_metadata_first() {
        let dir = tempfile::TempDir::new().unwrap();
        // "a-docs" sorts first but only holds documents
        write_file(
            dir.path(),
            "logs",
            "a-docs.json",
            Compression::None,
            &[DocRecord::new("x", json!({})).into()],
        );
        write_file(
            dir.path(),
            "logs",
            "b-meta.json.gz",
            Compression::Gzip,
            &[IndexRecord::new("x").into()],
        );

        let seen = shared();
        let mut pipeline = Pipeline::new().with_stage(Recorder::new("s", seen.clone(), shared()));
        let request = LoadRequest::new("logs", dir.path());
        pipeline.replay(&request).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["s:x", "s:x"]);
    }

    #[tokio::test]
    async fn test_stage_error_aborts_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let records: Vec<ArchiveRecord> = (0..20)
            .map(|i| DocRecord::new(format!("i{i}"), json!({})).into())
            .collect();
        write_file(dir.path(), "logs", "data.json", Compression::None, &records);

        let seen = shared();
        let finished = shared();
        let mut recorder = Recorder::new("s", seen.clone(), finished.clone());
        recorder.fail_on = Some(3);
        let mut pipeline = Pipeline::new().with_stage(recorder);

        let request = LoadRequest::new("logs", dir.path()).with_channel_capacity(2);
        let err = pipeline.replay(&request).await.unwrap_err();

        assert!(matches!(err, LoadError::BulkIndex { ref index, .. } if index == "i2"));
        assert_eq!(seen.lock().unwrap().len(), 3);
        // No flush after a failure
        assert!(finished.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_aborts_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = dir.path().join("logs");
        std::fs::create_dir_all(&archive).unwrap();
        std::fs::write(
            archive.join("data.json"),
            "{\"type\":\"doc\",\"value\":{\"index\":\"a\",\"source\":{}}}\n\n{ not json",
        )
        .unwrap();

        let seen = shared();
        let mut pipeline = Pipeline::new().with_stage(Recorder::new("s", seen.clone(), shared()));
        let err = pipeline
            .replay(&LoadRequest::new("logs", dir.path()))
            .await
            .unwrap_err();

        assert!(matches!(err, LoadError::MalformedArchive { ref archive, .. } if archive == "logs"));
        assert_eq!(*seen.lock().unwrap(), vec!["s:a"]);
    }

    #[tokio::test]
    async fn test_missing_archive() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut pipeline = Pipeline::new();
        let err = pipeline
            .replay(&LoadRequest::new("nope", dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ArchiveNotFound { .. }));
    }
}
