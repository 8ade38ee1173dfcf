//! Tests for ArchiveHolder.

use super::*;
use crate::archive::ZipTree;
use crate::context::{HolderContext, open_path};
use crate::media::WalkdirIndex;
use crate::settings::HolderSettings;
use crate::test_support::{write_sample_zip, write_zip};
use std::fs;
use std::path::Path;

fn open_sample(dir: &Path) -> ArchiveHolder {
    let archive = dir.join("sample.zip");
    write_sample_zip(&archive);
    let tree = Arc::new(ZipTree::new(&archive, &dir.join("scratch")));
    ArchiveHolder::open_root(tree)
}

fn sorted_names(holders: &[Holder]) -> Vec<String> {
    let mut names: Vec<String> = holders.iter().map(|h| h.name()).collect();
    names.sort();
    names
}

#[test]
fn test_root_lists_top_level() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());

    assert!(root.is_archive_root());
    assert_eq!(root.name(), "sample.zip");
    assert!(root.describe().is_folder);
    assert_eq!(sorted_names(&root.list_content()), vec!["a", "c.txt"]);
    assert_eq!(root.content_count(), ContentCount { files: 1, folders: 1 });
}

#[test]
fn test_nested_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());
    let a = root.find_file("a").unwrap();
    let b = a.find_file("b.txt").unwrap();

    let desc = b.describe();
    assert_eq!(desc.unique_path, "a/b.txt");
    assert_eq!(desc.display_name, "b.txt");
    assert_eq!(desc.extension, "txt");
    assert_eq!(desc.size, 12);
    assert!(!desc.is_folder);
    assert!(!desc.can_add_new_content);
    assert!(a.describe().can_add_new_content);
}

#[test]
fn test_parent_chain_ends_at_archive_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());
    let b = root.find_file("a").unwrap().find_file("b.txt").unwrap();

    let a = b.parent().unwrap();
    assert_eq!(a.unique_path(), "a");
    let top = a.parent().unwrap();
    assert_eq!(top.name(), "sample.zip");
    assert!(top.parent().is_none());
    assert!(root.parent().is_none());
}

#[test]
fn test_create_sub_folder_then_find() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());

    let created = root.create_sub_folder("new").unwrap();
    assert!(created.describe().is_folder);
    assert!(root.find_file("new").is_some());
    assert_eq!(sorted_names(&root.list_content()), vec!["a", "c.txt", "new"]);

    let file = created.create_sub_file("inner.txt").unwrap();
    assert_eq!(file.unique_path(), "new/inner.txt");
    assert_eq!(file.describe().size, 0);
}

#[test]
fn test_colliding_create_fails_and_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());
    let a = root.find_file("a").unwrap();

    assert!(root.create_sub_folder("a").is_none());
    assert!(root.create_sub_file("c.txt").is_none());
    assert!(a.create_sub_file("b.txt").is_none());
    assert!(root.create_sub_file("bad/name").is_none());

    let b = a.find_file("b.txt").unwrap();
    let extracted = b.local_path().unwrap();
    assert_eq!(fs::read(extracted).unwrap(), b"hello from b");
}

#[test]
fn test_local_path_extracts_files_only() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());

    let c = root.find_file("c.txt").unwrap();
    let extracted = c.local_path().unwrap();
    assert!(extracted.starts_with(dir.path().join("scratch")));
    assert_eq!(fs::read(&extracted).unwrap(), b"see");

    assert!(root.find_file("a").unwrap().local_path().is_none());
}

#[test]
fn test_holder_goes_stale_after_external_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let root = open_sample(dir.path());
    let c = root.find_file("c.txt").unwrap();
    let a = root.find_file("a").unwrap();
    assert!(c.is_valid());

    write_zip(&dir.path().join("sample.zip"), &[("only.txt", b"x")]);
    root.tree().prepare().unwrap();

    assert!(!c.is_valid());
    assert!(!c.describe().can_read);
    assert!(a.list_content().is_empty());
    assert_eq!(a.content_count(), ContentCount::default());
    assert_eq!(sorted_names(&root.list_content()), vec!["only.txt"]);
}

#[test]
fn test_corrupt_archive_lists_empty() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("broken.zip");
    fs::write(&archive, b"this is not a zip").unwrap();
    let root = ArchiveHolder::open_root(Arc::new(ZipTree::new(&archive, &dir.path().join("scratch"))));

    assert!(root.list_content().is_empty());
    assert_eq!(root.content_count(), ContentCount::default());
    assert!(!root.is_valid());
    assert!(root.create_sub_folder("x").is_none());
}

#[test]
fn test_open_path_picks_archive_holder_for_zip_files() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_zip(&dir.path().join("bundle.jar"));
    fs::create_dir(dir.path().join("folder.zip")).unwrap();

    let settings = HolderSettings {
        scratch_dir: Some(dir.path().join("scratch")),
        ..HolderSettings::default()
    };
    let ctx = HolderContext::new(settings, Arc::new(WalkdirIndex::new(Vec::new())));

    let jar = open_path(&ctx, &dir.path().join("bundle.jar"));
    assert_eq!(jar.name(), "bundle.jar");
    assert_eq!(sorted_names(&jar.list_content()), vec!["a", "c.txt"]);
    assert!(jar.local_path().is_none());

    // A folder named like an archive is still a folder
    let folder = open_path(&ctx, &dir.path().join("folder.zip"));
    assert!(folder.local_path().is_some());
    assert_eq!(ctx.archives.open_count(), 1);
}
