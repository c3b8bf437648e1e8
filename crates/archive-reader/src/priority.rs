//! File ordering so index metadata is seen before documents.
//!
//! Records are never reordered inside a file. Instead, whole files that
//! carry index metadata are moved ahead of files that carry only
//! documents. This keeps the metadata-before-documents guarantee without
//! a global sort of individual records.

use tracing::debug;

use crate::files::ArchiveFile;
use crate::records::probe_first_is_index;

/// File name marker used by archive producers for metadata files.
const MAPPINGS_MARKER: &str = "mappings";

/// Whether a file holds index metadata.
///
/// Decided by its name, or else by decoding only its first record.
pub fn is_metadata_file(file: &ArchiveFile) -> bool {
    if file.name.contains(MAPPINGS_MARKER) {
        return true;
    }
    probe_first_is_index(&file.path)
}

/// Reorder files so metadata files come first.
///
/// The partition is stable: files of the same class keep their order.
pub fn prioritize(files: Vec<ArchiveFile>) -> Vec<ArchiveFile> {
    let (mut ordered, documents): (Vec<_>, Vec<_>) =
        files.into_iter().partition(is_metadata_file);

    debug!(
        metadata_files = ordered.len(),
        document_files = documents.len(),
        "Prioritized archive files"
    );

    ordered.extend(documents);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const DOC: &str = r#"{"type":"doc","value":{"index":"x","source":{}}}"#;
    const META: &str = r#"{"type":"index","value":{"index":"x"}}"#;

    fn file(dir: &Path, name: &str, content: &str) -> ArchiveFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        ArchiveFile::new(path)
    }

    fn names(files: &[ArchiveFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_mappings_file_sorted_first() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            file(dir.path(), "data.json", DOC),
            file(dir.path(), "mappings.json", META),
        ];

        assert_eq!(names(&prioritize(files)), vec!["mappings.json", "data.json"]);
    }

    #[test]
    fn test_probe_detects_unnamed_metadata_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            file(dir.path(), "a_docs.json", DOC),
            file(dir.path(), "b_schema.json", META),
        ];

        assert_eq!(names(&prioritize(files)), vec!["b_schema.json", "a_docs.json"]);
    }

    #[test]
    fn test_name_match_wins_without_probe() {
        let dir = TempDir::new().unwrap();
        // Unparseable, but named like a metadata file
        let f = file(dir.path(), "mappings.json", "garbage");
        assert!(is_metadata_file(&f));
    }

    #[test]
    fn test_stable_within_class() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            file(dir.path(), "d1.json", DOC),
            file(dir.path(), "m1.json", META),
            file(dir.path(), "d2.json", DOC),
            file(dir.path(), "m2_mappings.json", META),
            file(dir.path(), "d3.json", DOC),
        ];

        assert_eq!(
            names(&prioritize(files)),
            vec!["m1.json", "m2_mappings.json", "d1.json", "d2.json", "d3.json"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(prioritize(Vec::new()).is_empty());
    }
}
