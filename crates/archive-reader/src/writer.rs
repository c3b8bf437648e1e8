//! Archive file writer.
//!
//! Produces files in the framing the reader expects: each record
//! pretty-printed, followed by a blank line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;

use archive_types::ArchiveRecord;

use crate::error::ReaderError;
use crate::files::Compression;

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Plain(w) => w,
            Sink::Gzip(w) => w,
        }
    }
}

/// Writes archive records to one file.
///
/// Call [`ArchiveWriter::finish`] to flush; a gzip file dropped without
/// `finish` may be truncated.
pub struct ArchiveWriter {
    path: PathBuf,
    sink: Sink,
    records: usize,
}

impl ArchiveWriter {
    /// Create (or truncate) a file for writing.
    pub fn create(path: &Path, compression: Compression) -> Result<Self, ReaderError> {
        let file = File::create(path).map_err(|e| ReaderError::io(path, e))?;
        let buffered = BufWriter::new(file);
        let sink = match compression {
            Compression::None => Sink::Plain(buffered),
            Compression::Gzip => Sink::Gzip(GzEncoder::new(
                buffered,
                flate2::Compression::default(),
            )),
        };

        Ok(Self {
            path: path.to_path_buf(),
            sink,
            records: 0,
        })
    }

    /// Append one record.
    pub fn write_record(&mut self, record: &ArchiveRecord) -> Result<(), ReaderError> {
        let body = serde_json::to_vec_pretty(record)
            .map_err(|e| ReaderError::malformed(&self.path, self.records + 1, e.to_string()))?;

        let writer = self.sink.writer();
        writer
            .write_all(&body)
            .and_then(|_| writer.write_all(b"\n\n"))
            .map_err(|e| ReaderError::io(&self.path, e))?;

        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and close the file, returning the number of records written.
    pub fn finish(self) -> Result<usize, ReaderError> {
        let path = self.path;
        let mut buffered = match self.sink {
            Sink::Plain(w) => w,
            Sink::Gzip(w) => w.finish().map_err(|e| ReaderError::io(&path, e))?,
        };
        buffered.flush().map_err(|e| ReaderError::io(&path, e))?;
        Ok(self.records)
    }
}

/// Write a whole file of records.
pub fn write_archive_file<'a>(
    path: &Path,
    compression: Compression,
    records: impl IntoIterator<Item = &'a ArchiveRecord>,
) -> Result<usize, ReaderError> {
    let mut writer = ArchiveWriter::create(path, compression)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive_types::{DocRecord, IndexRecord};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::records::open_records;

    fn sample() -> Vec<ArchiveRecord> {
        vec![
            IndexRecord::new("logs")
                .with_settings(json!({"number_of_shards": 1}))
                .into(),
            DocRecord::new("logs", json!({"message": "one"}))
                .with_id("1")
                .into(),
            DocRecord::new("logs", json!({"message": "two"}))
                .with_routing("r1")
                .into(),
        ]
    }

    #[test]
    fn test_plain_file_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let written = write_archive_file(&path, Compression::None, &sample()).unwrap();
        assert_eq!(written, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n\n{"));
        assert_eq!(Compression::detect(&path).unwrap(), Compression::None);

        let read: Vec<_> = open_records(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn test_gzip_file_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json.gz");

        write_archive_file(&path, Compression::Gzip, &sample()).unwrap();
        assert_eq!(Compression::detect(&path).unwrap(), Compression::Gzip);

        let read: Vec<_> = open_records(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn test_record_counter() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::create(&dir.path().join("a.json"), Compression::None).unwrap();
        assert_eq!(writer.records(), 0);
        writer.write_record(&sample()[0]).unwrap();
        assert_eq!(writer.records(), 1);
        assert_eq!(writer.finish().unwrap(), 1);
    }
}
