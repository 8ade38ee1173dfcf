//! Entry descriptor and content count types, plus small helpers for building them.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Uniform description of one file, folder, archive member, or virtual root.
///
/// A snapshot: it is built fresh from the backing store on every `describe()`
/// and never points back at its holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDescriptor {
    /// Absolute path for local files, slash-joined path inside an archive,
    /// or a synthetic label like `virtual://recent` for virtual roots.
    pub unique_path: String,
    pub display_name: String,
    pub is_folder: bool,
    /// Epoch millis; 0 when not meaningful.
    pub last_modified: i64,
    /// Bytes; 0 for folders and virtual entries.
    pub size: u64,
    /// Lowercase, without the dot. Always empty for folders.
    pub extension: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_add_new_content: bool,
}

impl EntryDescriptor {
    /// Descriptor for a synthetic container (virtual aggregate or root).
    /// Readable, never writable, no timestamp or size.
    pub fn synthetic(unique_path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_path: unique_path.into(),
            display_name: display_name.into(),
            is_folder: true,
            last_modified: 0,
            size: 0,
            extension: String::new(),
            can_read: true,
            can_write: false,
            can_add_new_content: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.display_name)
    }
}

/// Direct-child counts of one container level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCount {
    pub files: usize,
    pub folders: usize,
}

impl ContentCount {
    pub fn from_descriptors<'a>(entries: impl IntoIterator<Item = &'a EntryDescriptor>) -> Self {
        entries.into_iter().fold(Self::default(), |mut count, entry| {
            if entry.is_folder {
                count.folders += 1;
            } else {
                count.files += 1;
            }
            count
        })
    }

    pub fn total(&self) -> usize {
        self.files + self.folders
    }
}

/// Names starting with a dot are hidden.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Extracts the lowercase extension of a file name.
///
/// Dotfiles like `.bashrc` and names ending with a dot have no extension.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(dot_pos) if dot_pos > 0 && dot_pos < name.len() - 1 => name[dot_pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Converts a `SystemTime` to epoch millis, 0 if it predates the epoch.
pub(crate) fn system_time_millis(time: std::time::SystemTime) -> i64 {
    time.duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Formats a byte count as a short human-readable string (base 1024).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// One-line summary shown under an entry's name.
///
/// Folders: "2 folders, 1 file" when a count is known. Files: size and local
/// modification time.
pub fn format_details(entry: &EntryDescriptor, count: Option<ContentCount>) -> String {
    if entry.is_folder {
        return match count {
            Some(count) => format!(
                "{} {}, {} {}",
                count.folders,
                if count.folders == 1 { "folder" } else { "folders" },
                count.files,
                if count.files == 1 { "file" } else { "files" }
            ),
            None => String::new(),
        };
    }

    let size = format_size(entry.size);
    if entry.last_modified == 0 {
        return size;
    }
    match Local.timestamp_millis_opt(entry.last_modified).single() {
        Some(date) => format!("{}, {}", size, date.format("%Y-%m-%d %H:%M")),
        None => size,
    }
}
