//! Archive directory listing and compression detection.

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::error::ReaderError;

/// gzip member header magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One file inside an archive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name without directory
    pub name: String,
}

impl ArchiveFile {
    /// Create from a path, taking the name from its last component.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// How an archive file is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain text
    None,
    /// gzip (one or more members)
    Gzip,
}

impl Compression {
    /// Classify from the leading bytes of a file.
    pub fn from_magic(prefix: &[u8]) -> Self {
        if prefix.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Detect the compression of a file by its signature.
    ///
    /// The file extension is ignored.
    pub fn detect(path: &Path) -> Result<Self, ReaderError> {
        let mut file = File::open(path).map_err(|e| ReaderError::io(path, e))?;
        let compression = sniff(&mut file).map_err(|e| ReaderError::io(path, e))?;
        Ok(compression)
    }
}

/// Read up to two bytes and rewind.
fn sniff(file: &mut File) -> std::io::Result<Compression> {
    let mut magic = [0u8; 2];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    file.seek(SeekFrom::Start(0))?;
    Ok(Compression::from_magic(&magic[..filled]))
}

/// Open a file as a decompressed byte stream.
pub fn open_decompressed(path: &Path) -> Result<Box<dyn Read + Send>, ReaderError> {
    let mut file = File::open(path).map_err(|e| ReaderError::io(path, e))?;
    let compression = sniff(&mut file).map_err(|e| ReaderError::io(path, e))?;

    debug!(file = %path.display(), ?compression, "Opened archive file");

    Ok(match compression {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))),
        Compression::None => Box::new(BufReader::new(file)),
    })
}

/// List the archive files in a directory.
///
/// Hidden files and sub-directories are skipped. Files are returned
/// sorted by name so that repeated loads see the same order.
pub fn list_archive_files(dir: &Path) -> Result<Vec<ArchiveFile>, ReaderError> {
    if !dir.is_dir() {
        return Err(ReaderError::NotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| ReaderError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReaderError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ReaderError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        let file = ArchiveFile::new(entry.path());
        if file.name.starts_with('.') {
            continue;
        }
        files.push(file);
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// List archive names (sub-directories) under a data directory.
pub fn list_archives(data_dir: &Path) -> Result<Vec<String>, ReaderError> {
    if !data_dir.is_dir() {
        return Err(ReaderError::NotFound(data_dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(data_dir).map_err(|e| ReaderError::io(data_dir, e))? {
        let entry = entry.map_err(|e| ReaderError::io(data_dir, e))?;
        if entry.path().is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_gzip(path: &Path, content: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_from_magic() {
        assert_eq!(Compression::from_magic(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(Compression::from_magic(b"{\"type\""), Compression::None);
        assert_eq!(Compression::from_magic(&[0x1f]), Compression::None);
        assert_eq!(Compression::from_magic(&[]), Compression::None);
    }

    #[test]
    fn test_detect_ignores_extension() {
        let dir = TempDir::new().unwrap();

        let mislabeled = dir.path().join("data.json");
        write_gzip(&mislabeled, b"{}");
        assert_eq!(Compression::detect(&mislabeled).unwrap(), Compression::Gzip);

        let plain = dir.path().join("data.json.gz");
        fs::write(&plain, b"{}").unwrap();
        assert_eq!(Compression::detect(&plain).unwrap(), Compression::None);

        let empty = dir.path().join("empty.json");
        fs::write(&empty, b"").unwrap();
        assert_eq!(Compression::detect(&empty).unwrap(), Compression::None);
    }

    #[test]
    fn test_open_decompressed_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json.gz");
        write_gzip(&path, b"hello archive");

        let mut content = String::new();
        open_decompressed(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello archive");
    }

    #[test]
    fn test_list_archive_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.json.gz"), b"").unwrap();
        fs::write(dir.path().join("mappings.json"), b"").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_archive_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["data.json.gz", "mappings.json"]);
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = list_archive_files(&missing);
        assert!(matches!(result, Err(ReaderError::NotFound(_))));
    }

    #[test]
    fn test_list_archives() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("logstash")).unwrap();
        fs::create_dir(dir.path().join("empty_kibana")).unwrap();
        fs::write(dir.path().join("README"), b"").unwrap();

        let names = list_archives(dir.path()).unwrap();
        assert_eq!(names, vec!["empty_kibana", "logstash"]);
    }
}
