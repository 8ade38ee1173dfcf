//! Shared helpers for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::ZipWriter;
use zip::write::FileOptions;

/// Writes a zip at `path`. Names ending in `/` become directory entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// The archive from the tree round-trip example: a folder `a` holding `b.txt`, and `c.txt`.
pub fn write_sample_zip(path: &Path) {
    write_zip(path, &[("a/", b""), ("a/b.txt", b"hello from b"), ("c.txt", b"see")]);
}
