//! End-to-end browsing through the public API: a local folder holding a zip,
//! the archive contents, and the synthetic root.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use content_holder::asynchronous::{content_count_async, list_sorted_content_async};
use content_holder::{
    ContentCount, Holder, HolderContext, HolderSettings, ListingPreferences, RootHolder, SortMethod, VirtualKind,
    open_path,
};
use zip::ZipWriter;
use zip::write::FileOptions;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, FileOptions::default()).unwrap();
        } else {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap();
}

fn names(holders: &[Holder]) -> Vec<String> {
    holders.iter().map(|h| h.name()).collect()
}

fn context_for(root: &Path) -> Arc<HolderContext> {
    let settings = HolderSettings {
        storage_roots: vec![root.to_path_buf()],
        scratch_dir: Some(root.join(".scratch")),
        bookmarks: vec![root.join("docs")],
        ..HolderSettings::default()
    };
    HolderContext::with_walkdir_index(settings)
}

#[test]
fn test_browse_from_folder_into_archive_and_back() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/readme.md"), b"# hi").unwrap();
    write_zip(
        &dir.path().join("docs/bundle.zip"),
        &[("src/", b""), ("src/main.rs", b"fn main() {}"), ("Cargo.toml", b"[package]")],
    );
    let ctx = context_for(dir.path());

    let docs = open_path(&ctx, &dir.path().join("docs"));
    let listed = docs.list_sorted_content(&ListingPreferences::default());
    assert_eq!(names(&listed), vec!["bundle.zip", "readme.md"]);

    // The listing yields plain files; opening the zip goes through open_path
    let bundle_path = listed[0].local_path().unwrap();
    let bundle = open_path(&ctx, &bundle_path);
    assert!(bundle.local_path().is_none());
    assert_eq!(names(&bundle.list_sorted_content(&ListingPreferences::default())), vec!["src", "Cargo.toml"]);

    let src = bundle.find_file("src").unwrap();
    let main_rs = src.find_file("main.rs").unwrap();
    let extracted = main_rs.local_path().unwrap();
    assert_eq!(fs::read(&extracted).unwrap(), b"fn main() {}");

    let created = src.create_sub_folder("bin").unwrap();
    assert!(created.is_valid());
    assert!(src.create_sub_folder("bin").is_none());
    assert_eq!(src.content_count(), ContentCount { files: 1, folders: 1 });

    // Reopening shares the session and sees the change
    let reopened = open_path(&ctx, &bundle_path);
    assert!(reopened.find_file("src").unwrap().find_file("bin").is_some());
    assert_eq!(ctx.archives.open_count(), 1);

    ctx.archives.close(&bundle_path);
    assert!(!extracted.exists());
}

#[test]
fn test_root_exposes_storage_and_collections() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("song.mp3"), b"la").unwrap();
    let ctx = context_for(dir.path());

    let root = RootHolder::shared(Arc::clone(&ctx));
    let children = root.list_content();
    assert_eq!(children.len(), 1 + 2 + 5);

    let audio_path = format!("virtual://{}", VirtualKind::Media(content_holder::MediaCategory::Audio).label());
    let audio = children.iter().find(|c| c.unique_path() == audio_path).unwrap();
    assert_eq!(names(&audio.list_content()), vec!["song.mp3"]);

    let bookmarks = children.iter().find(|c| c.unique_path() == "virtual://bookmarks").unwrap();
    assert_eq!(names(&bookmarks.list_content()), vec!["docs"]);
}

#[test]
fn test_sorted_listing_by_size_descending() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("small.txt"), b"1").unwrap();
    fs::write(dir.path().join("large.txt"), b"1234567890").unwrap();
    fs::write(dir.path().join("medium.txt"), b"12345").unwrap();
    fs::create_dir(dir.path().join("folder")).unwrap();
    let ctx = context_for(dir.path());

    let prefs = ListingPreferences {
        method: SortMethod::Size,
        reverse: true,
        ..ListingPreferences::default()
    };
    let holder = open_path(&ctx, dir.path());
    assert_eq!(
        names(&holder.list_sorted_content(&prefs)),
        vec!["folder", "large.txt", "medium.txt", "small.txt"]
    );
}

#[tokio::test]
async fn test_async_helpers_on_archive() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(&dir.path().join("data.zip"), &[("x.txt", b"x"), ("y/", b"")]);
    let ctx = context_for(dir.path());
    let archive = open_path(&ctx, &dir.path().join("data.zip"));

    let listed = list_sorted_content_async(Arc::clone(&archive), ListingPreferences::default()).await;
    assert_eq!(names(&listed), vec!["y", "x.txt"]);
    assert_eq!(content_count_async(archive).await, ContentCount { files: 1, folders: 1 });
}
