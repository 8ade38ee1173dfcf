//! Tests for VirtualHolder collections.

use super::*;
use super::virtual_aggregate::has_hidden_component;
use crate::context::HolderContext;
use crate::media::{IndexedFile, MediaCategory, MediaIndex};
use crate::settings::{HolderSettings, RecentSettings};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

/// Index that returns a fixed file list regardless of category.
struct FixedIndex(Vec<IndexedFile>);

impl MediaIndex for FixedIndex {
    fn files_modified_since(&self, since_millis: i64) -> Vec<IndexedFile> {
        self.0.iter().filter(|f| f.last_modified >= since_millis).cloned().collect()
    }

    fn files_in_category(&self, category: MediaCategory) -> Vec<IndexedFile> {
        self.0
            .iter()
            .filter(|f| MediaCategory::classify(&f.path) == Some(category))
            .cloned()
            .collect()
    }
}

fn settings_for(root: &Path) -> HolderSettings {
    HolderSettings {
        storage_roots: vec![root.to_path_buf()],
        scratch_dir: Some(root.join(".scratch")),
        ..HolderSettings::default()
    }
}

fn touch_minutes_ago(path: &Path, minutes: i64) {
    fs::write(path, b"x").unwrap();
    let when = chrono::Utc::now().timestamp() - minutes * 60;
    filetime::set_file_mtime(path, FileTime::from_unix_time(when, 0)).unwrap();
}

fn names(holders: &[Holder]) -> Vec<String> {
    holders.iter().map(|h| h.name()).collect()
}

#[test]
fn test_recent_files_capped_and_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..30 {
        touch_minutes_ago(&dir.path().join(format!("file{:02}.txt", i)), i * 10 + 1);
    }
    let ctx = HolderContext::with_walkdir_index(settings_for(dir.path()));
    let recent = VirtualHolder::new(VirtualKind::RecentFiles, ctx);

    let listed = names(&recent.list_content());
    assert_eq!(listed.len(), 25);
    let expected: Vec<String> = (0..25).map(|i| format!("file{:02}.txt", i)).collect();
    assert_eq!(listed, expected);
    assert_eq!(recent.content_count(), ContentCount { files: 25, folders: 0 });
}

#[test]
fn test_recent_files_window_and_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".cache")).unwrap();
    fs::create_dir_all(dir.path().join("skip")).unwrap();
    touch_minutes_ago(&dir.path().join("fresh.txt"), 5);
    touch_minutes_ago(&dir.path().join("stale.txt"), 49 * 60);
    touch_minutes_ago(&dir.path().join(".hidden.txt"), 5);
    touch_minutes_ago(&dir.path().join(".cache/blob"), 5);
    touch_minutes_ago(&dir.path().join("skip/ignored.txt"), 5);

    let settings = HolderSettings {
        recent: RecentSettings {
            excluded_paths: vec![dir.path().join("skip")],
            ..RecentSettings::default()
        },
        ..settings_for(dir.path())
    };
    let ctx = HolderContext::with_walkdir_index(settings);
    let recent = VirtualHolder::new(VirtualKind::RecentFiles, ctx);

    assert_eq!(names(&recent.list_content()), vec!["fresh.txt"]);
}

#[test]
fn test_recent_files_include_hidden_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    touch_minutes_ago(&dir.path().join(".profile"), 5);
    touch_minutes_ago(&dir.path().join("visible.txt"), 10);

    let settings = HolderSettings {
        recent: RecentSettings {
            exclude_hidden: false,
            ..RecentSettings::default()
        },
        ..settings_for(dir.path())
    };
    let ctx = HolderContext::with_walkdir_index(settings);
    let recent = VirtualHolder::new(VirtualKind::RecentFiles, ctx);

    assert_eq!(names(&recent.list_content()), vec![".profile", "visible.txt"]);
}

#[test]
fn test_recent_files_skip_entries_gone_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    touch_minutes_ago(&dir.path().join("here.txt"), 1);
    let index = FixedIndex(vec![
        IndexedFile {
            path: dir.path().join("gone.txt"),
            last_modified: now,
        },
        IndexedFile {
            path: dir.path().join("here.txt"),
            last_modified: now - 60_000,
        },
    ]);
    let ctx = HolderContext::new(settings_for(dir.path()), Arc::new(index));
    let recent = VirtualHolder::new(VirtualKind::RecentFiles, ctx);

    assert_eq!(names(&recent.list_content()), vec!["here.txt"]);
}

#[test]
fn test_bookmarks_keep_order_and_drop_missing() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("projects")).unwrap();
    fs::write(dir.path().join("notes.txt"), b"n").unwrap();

    let bookmarks: Vec<PathBuf> = vec![
        dir.path().join("projects"),
        dir.path().join("deleted"),
        dir.path().join("notes.txt"),
    ];
    let settings = HolderSettings {
        bookmarks,
        ..settings_for(dir.path())
    };
    let ctx = HolderContext::new(settings, Arc::new(FixedIndex(Vec::new())));
    let holder = VirtualHolder::new(VirtualKind::Bookmarks, ctx);

    assert_eq!(names(&holder.list_content()), vec!["projects", "notes.txt"]);
    assert_eq!(holder.content_count(), ContentCount { files: 1, folders: 1 });
}

#[test]
fn test_media_collection_by_category() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("music/live")).unwrap();
    fs::write(dir.path().join("music/song.mp3"), b"a").unwrap();
    fs::write(dir.path().join("music/live/set.flac"), b"a").unwrap();
    fs::write(dir.path().join("photo.jpg"), b"i").unwrap();
    fs::write(dir.path().join("notes.txt"), b"d").unwrap();

    let ctx = HolderContext::with_walkdir_index(settings_for(dir.path()));

    let audio = VirtualHolder::new(VirtualKind::Media(MediaCategory::Audio), Arc::clone(&ctx));
    let mut listed = names(&audio.list_content());
    listed.sort();
    assert_eq!(listed, vec!["set.flac", "song.mp3"]);

    let images = VirtualHolder::new(VirtualKind::Media(MediaCategory::Image), Arc::clone(&ctx));
    assert_eq!(names(&images.list_content()), vec!["photo.jpg"]);

    let videos = VirtualHolder::new(VirtualKind::Media(MediaCategory::Video), ctx);
    assert!(videos.list_content().is_empty());
    assert_eq!(videos.content_count(), ContentCount::default());
}

#[test]
fn test_virtual_holders_are_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = HolderContext::new(settings_for(dir.path()), Arc::new(FixedIndex(Vec::new())));
    let holder = VirtualHolder::new(VirtualKind::Bookmarks, ctx);

    let desc = holder.describe();
    assert_eq!(desc.unique_path, "virtual://bookmarks");
    assert_eq!(desc.display_name, "Bookmarks");
    assert!(desc.is_folder);
    assert!(!desc.can_write);
    assert!(!desc.can_add_new_content);

    assert!(holder.create_sub_file("x.txt").is_none());
    assert!(holder.create_sub_folder("x").is_none());
    assert!(!dir.path().join("x.txt").exists());
    assert!(holder.parent().is_none());
    assert!(holder.is_valid());
    assert!(holder.local_path().is_none());
}

#[test]
fn test_kind_labels_round_trip() {
    let kinds = [
        VirtualKind::RecentFiles,
        VirtualKind::Bookmarks,
        VirtualKind::Media(MediaCategory::Document),
    ];
    for kind in kinds {
        assert_eq!(VirtualKind::from_label(kind.label()), Some(kind));
    }
    assert_eq!(VirtualKind::from_label("trash"), None);
}

#[test]
fn test_hidden_component_is_relative_to_storage_root() {
    let roots = vec![PathBuf::from("/home/.me"), PathBuf::from("/home/.me/Storage")];
    assert!(!has_hidden_component(Path::new("/home/.me/Storage/a.txt"), &roots));
    assert!(has_hidden_component(Path::new("/home/.me/Storage/.git/config"), &roots));
    assert!(has_hidden_component(Path::new("/elsewhere/.x/y"), &roots));
}
