//! Media categories and the content index the virtual collections query.
//!
//! Virtual holders never walk the file system themselves. They ask a
//! [`MediaIndex`], which may be backed by a platform index or, by default, by
//! [`WalkdirIndex`] scanning the configured storage roots.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::listing::entry::system_time_millis;
use crate::listing::extension_of;

/// Collections offered by media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaCategory {
    Audio,
    Video,
    Image,
    Document,
    Archive,
}

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "odt", "rtf", "txt", "md", "epub", "xls", "xlsx", "ods", "csv", "ppt", "pptx", "odp",
    "html", "htm", "xml", "json",
];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "jar", "apk", "aar", "rar", "7z", "tar", "gz", "tgz", "bz2", "tbz2", "xz", "txz", "zst",
];

impl MediaCategory {
    pub const ALL: [MediaCategory; 5] = [Self::Audio, Self::Video, Self::Image, Self::Document, Self::Archive];

    /// Short label, also used in virtual paths (`virtual://audio`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Image => "image",
            Self::Document => "document",
            Self::Archive => "archive",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Video => "Videos",
            Self::Image => "Images",
            Self::Document => "Documents",
            Self::Archive => "Archives",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }

    /// Classifies a file by its type metadata (MIME type from the extension).
    /// Never reads file contents.
    pub fn classify(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy();
        let extension = extension_of(&name);
        if extension.is_empty() {
            return None;
        }
        if ARCHIVE_EXTENSIONS.contains(&extension.as_str()) {
            return Some(Self::Archive);
        }
        if DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
            return Some(Self::Document);
        }
        let mime = mime_guess::from_ext(&extension).first()?;
        match mime.type_().as_str() {
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// A file known to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub path: PathBuf,
    /// Epoch millis.
    pub last_modified: i64,
}

/// System-wide file queries backing the virtual collections.
pub trait MediaIndex: Send + Sync {
    /// Regular files modified at or after `since_millis`, in no particular order.
    fn files_modified_since(&self, since_millis: i64) -> Vec<IndexedFile>;

    /// Regular files belonging to `category`, in no particular order.
    fn files_in_category(&self, category: MediaCategory) -> Vec<IndexedFile>;
}

/// Index that walks a set of roots on every query.
pub struct WalkdirIndex {
    roots: Vec<PathBuf>,
}

impl WalkdirIndex {
    /// Roots nested inside another root are dropped so nothing is walked twice.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut kept: Vec<PathBuf> = Vec::new();
        for root in roots {
            if kept.iter().any(|existing| root.starts_with(existing)) {
                continue;
            }
            kept.retain(|existing| !existing.starts_with(&root));
            kept.push(root);
        }
        Self { roots: kept }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn collect(&self, mut keep: impl FnMut(&Path, i64) -> bool) -> Vec<IndexedFile> {
        let start = std::time::Instant::now();
        let mut files = Vec::new();
        let mut skipped = 0usize;

        for root in &self.roots {
            // Stay on one file system so /proc and network mounts aren't walked
            for entry in WalkDir::new(root).same_file_system(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(_) => {
                        skipped += 1;
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(metadata) = entry.metadata() else {
                    skipped += 1;
                    continue;
                };
                let modified = metadata.modified().map(system_time_millis).unwrap_or(0);
                if keep(entry.path(), modified) {
                    files.push(IndexedFile {
                        path: entry.into_path(),
                        last_modified: modified,
                    });
                }
            }
        }

        log::debug!(
            "WalkdirIndex: roots={}, matched={}, skipped={}, took={}ms",
            self.roots.len(),
            files.len(),
            skipped,
            start.elapsed().as_millis()
        );
        files
    }
}

impl MediaIndex for WalkdirIndex {
    fn files_modified_since(&self, since_millis: i64) -> Vec<IndexedFile> {
        self.collect(|_, modified| modified >= since_millis)
    }

    fn files_in_category(&self, category: MediaCategory) -> Vec<IndexedFile> {
        self.collect(|path, _| MediaCategory::classify(path) == Some(category))
    }
}
