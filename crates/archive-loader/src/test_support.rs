//! Archive fixtures shared by the unit tests.

use std::path::Path;

use archive_reader::{write_archive_file, Compression};
use archive_types::ArchiveRecord;

/// Write `records` to `<data_dir>/<archive>/<file>`.
pub fn write_file(
    data_dir: &Path,
    archive: &str,
    file: &str,
    compression: Compression,
    records: &[ArchiveRecord],
) {
    let dir = data_dir.join(archive);
    std::fs::create_dir_all(&dir).unwrap();
    write_archive_file(&dir.join(file), compression, records).unwrap();
}
