//! Streaming decoder for archive record files.
//!
//! A record file is a whitespace-separated sequence of JSON objects. The
//! writer pretty-prints each record and separates records with a blank
//! line, but one-record-per-line files decode the same way.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::de::IoRead;
use serde_json::StreamDeserializer;

use archive_types::ArchiveRecord;

use crate::error::ReaderError;
use crate::files::open_decompressed;

/// Lazy, finite, non-restartable sequence of records from one file.
///
/// Yields `Err` at most once; the sequence ends after the first error.
pub struct RecordReader {
    path: PathBuf,
    records: StreamDeserializer<'static, IoRead<Box<dyn Read + Send>>, ArchiveRecord>,
    position: usize,
    done: bool,
}

impl RecordReader {
    /// Decode records from an already-decompressed byte stream.
    pub fn new(path: impl Into<PathBuf>, reader: Box<dyn Read + Send>) -> Self {
        Self {
            path: path.into(),
            records: serde_json::Deserializer::from_reader(reader).into_iter(),
            position: 0,
            done: false,
        }
    }

    /// Path of the file being decoded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records yielded so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for RecordReader {
    type Item = Result<ArchiveRecord, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.records.next() {
            Some(Ok(record)) => {
                self.position += 1;
                Some(Ok(record))
            }
            Some(Err(err)) => {
                self.done = true;
                Some(Err(ReaderError::malformed(
                    &self.path,
                    self.position + 1,
                    err.to_string(),
                )))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Open an archive file and decode its records lazily.
pub fn open_records(path: &Path) -> Result<RecordReader, ReaderError> {
    let reader = open_decompressed(path)?;
    Ok(RecordReader::new(path, reader))
}

/// Decode only the first record of a file and report whether it is
/// index metadata.
///
/// Unreadable or empty files report `false`; the full read surfaces
/// their errors later.
pub fn probe_first_is_index(path: &Path) -> bool {
    match open_records(path) {
        Ok(mut records) => matches!(records.next(), Some(Ok(record)) if record.is_index()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TWO_RECORDS: &str = r#"{
  "type": "index",
  "value": {
    "index": "logs",
    "mappings": { "properties": {} }
  }
}

{
  "type": "doc",
  "value": {
    "index": "logs",
    "id": "1",
    "source": { "message": "first" }
  }
}
"#;

    #[test]
    fn test_decode_pretty_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, TWO_RECORDS).unwrap();

        let records: Vec<_> = open_records(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].is_index());
        assert!(!records[1].is_index());
        assert_eq!(records[1].index(), "logs");
    }

    #[test]
    fn test_decode_single_line_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.ndjson");
        fs::write(
            &path,
            "{\"type\":\"doc\",\"value\":{\"index\":\"a\",\"source\":{}}}\n{\"type\":\"doc\",\"value\":{\"index\":\"b\",\"source\":{}}}\n",
        )
        .unwrap();

        let indices: Vec<String> = open_records(&path)
            .unwrap()
            .map(|r| r.unwrap().index().to_string())
            .collect();
        assert_eq!(indices, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "\n\n").unwrap();

        assert_eq!(open_records(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_record_stops_sequence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(
            &path,
            "{\"type\":\"doc\",\"value\":{\"index\":\"a\",\"source\":{}}}\n\n{\"type\": \"doc\", \"value\": {\n\n{\"type\":\"doc\",\"value\":{\"index\":\"c\",\"source\":{}}}",
        )
        .unwrap();

        let mut records = open_records(&path).unwrap();
        assert!(records.next().unwrap().is_ok());

        let err = records.next().unwrap().unwrap_err();
        match err {
            ReaderError::Malformed { record, path: p, .. } => {
                assert_eq!(record, 2);
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(records.next().is_none());
        assert_eq!(records.position(), 1);
    }

    #[test]
    fn test_unknown_record_type_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.json");
        fs::write(&path, r#"{"type":"alias","value":{"index":"a"}}"#).unwrap();

        let result = open_records(&path).unwrap().next().unwrap();
        assert!(matches!(result, Err(ReaderError::Malformed { .. })));
    }

    #[test]
    fn test_corrupt_gzip_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json.gz");
        // gzip magic followed by garbage
        fs::write(&path, [0x1f, 0x8b, 0x08, 0x00, 0xde, 0xad, 0xbe, 0xef]).unwrap();

        let result = open_records(&path).unwrap().next().unwrap();
        assert!(matches!(result, Err(ReaderError::Malformed { .. })));
    }

    #[test]
    fn test_probe_first_is_index() {
        let dir = TempDir::new().unwrap();

        let meta = dir.path().join("a.json");
        fs::write(&meta, TWO_RECORDS).unwrap();
        assert!(probe_first_is_index(&meta));

        let docs = dir.path().join("b.json");
        fs::write(&docs, r#"{"type":"doc","value":{"index":"x","source":{}}}"#).unwrap();
        assert!(!probe_first_is_index(&docs));

        let garbage = dir.path().join("c.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(!probe_first_is_index(&garbage));

        assert!(!probe_first_is_index(&dir.path().join("missing.json")));
    }
}
