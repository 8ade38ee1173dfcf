//! Zip archive browsing - the node tree and the per-archive session around it.

pub mod tree;
pub mod zip_tree;

pub use tree::{ArchiveNode, RawArchiveEntry, build_tree, find_node_by_path, join_path, parent_path};
pub use zip_tree::{ArchiveRegistry, TreeStatus, ZipTree};

/// Extensions opened as zip archives.
pub const ZIP_EXTENSIONS: [&str; 4] = ["zip", "jar", "apk", "aar"];

/// Returns true if a file with this extension is browsed as a zip archive.
pub fn is_zip_extension(extension: &str) -> bool {
    ZIP_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}
