//! Settings loading from a JSON file.
//!
//! Everything has a default, so a missing or partial file still yields usable
//! settings. The listing preferences here are the starting point; callers may
//! pass different ones per listing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::listing::ListingPreferences;

/// Settings for the "recent files" aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentSettings {
    /// How far back a modification still counts as recent.
    pub window_hours: u64,
    /// Maximum number of entries returned.
    pub max_count: usize,
    /// Skip files with a hidden path component.
    pub exclude_hidden: bool,
    /// Path prefixes that never show up in recent files.
    pub excluded_paths: Vec<PathBuf>,
}

impl Default for RecentSettings {
    fn default() -> Self {
        Self {
            window_hours: 48,
            max_count: 25,
            exclude_hidden: true,
            excluded_paths: Vec::new(),
        }
    }
}

/// User settings consumed by the holders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HolderSettings {
    pub listing: ListingPreferences,
    pub recent: RecentSettings,
    /// Ordered, user-curated list of bookmarked paths.
    pub bookmarks: Vec<PathBuf>,
    /// Top-level locations listed by the root holder and walked by the default index.
    /// Empty means the home directory and `/`.
    pub storage_roots: Vec<PathBuf>,
    /// Where archive previews get extracted. Defaults to a folder under the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl HolderSettings {
    /// Base directory for per-archive scratch folders.
    pub fn scratch_base(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("content-holder"))
    }

    /// Configured storage roots, or the home directory and `/` when none are set.
    pub fn effective_storage_roots(&self) -> Vec<PathBuf> {
        if !self.storage_roots.is_empty() {
            return self.storage_roots.clone();
        }
        let mut roots = Vec::new();
        if let Some(home) = dirs::home_dir() {
            roots.push(home);
        }
        let fs_root = PathBuf::from("/");
        if !roots.contains(&fs_root) {
            roots.push(fs_root);
        }
        roots
    }
}

/// Parses settings JSON. Missing keys take their defaults.
pub fn parse_settings(contents: &str) -> Result<HolderSettings, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Loads settings from a JSON file.
/// Returns defaults if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> HolderSettings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::debug!("load_settings: can't read {}: {}, using defaults", path.display(), e);
            return HolderSettings::default();
        }
    };

    match parse_settings(&contents) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("load_settings: invalid JSON in {}: {}, using defaults", path.display(), e);
            HolderSettings::default()
        }
    }
}

/// Default settings file location: `<config dir>/content-holder/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("content-holder").join("settings.json"))
}
