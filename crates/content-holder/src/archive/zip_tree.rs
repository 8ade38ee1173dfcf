//! Zip archive session: tree building, extraction for preview, and in-place mutation.
//!
//! One `ZipTree` exists per archive file (see [`ArchiveRegistry`]). The tree is
//! built on first access and rebuilt after every mutation. All rebuilds,
//! mutations, and extractions run under one mutex, so a reader either sees the
//! tree from before a rebuild or the complete tree after it, never a mix.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, TimeZone};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::tree::{ArchiveNode, RawArchiveEntry, build_tree, find_node_by_path, normalize_path, parent_path};
use crate::error::HolderError;
use crate::holder::local::is_writable;
use crate::ignore_poison::IgnorePoison;

/// Lifecycle of the in-memory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStatus {
    NotReady,
    Preparing,
    Ready,
}

impl TreeStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Preparing,
            2 => Self::Ready,
            _ => Self::NotReady,
        }
    }
}

#[derive(Default)]
struct TreeState {
    root: Option<Arc<ArchiveNode>>,
    /// Bumped on every successful rebuild.
    generation: u64,
    /// Normalized entry path -> index in the archive's central directory.
    entry_indices: HashMap<String, usize>,
    /// Normalized entry path -> (generation, extracted file).
    extracted: HashMap<String, (u64, PathBuf)>,
}

/// A zip file opened for browsing.
pub struct ZipTree {
    archive_path: PathBuf,
    scratch_dir: PathBuf,
    state: Mutex<TreeState>,
    status: AtomicU8,
    /// Mirror of `TreeState::generation`, readable without the lock.
    generation: AtomicU64,
}

impl ZipTree {
    /// Creates a session for `archive_path`. Nothing is read until first access.
    ///
    /// Previews get extracted into a unique folder under `scratch_base`.
    pub fn new(archive_path: impl Into<PathBuf>, scratch_base: &Path) -> Self {
        Self {
            archive_path: archive_path.into(),
            scratch_dir: scratch_base.join(uuid::Uuid::new_v4().to_string()),
            state: Mutex::new(TreeState::default()),
            status: AtomicU8::new(TreeStatus::NotReady as u8),
            generation: AtomicU64::new(0),
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn status(&self) -> TreeStatus {
        TreeStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Whether entries can be added, i.e. the archive file itself is writable.
    pub fn is_writable(&self) -> bool {
        is_writable(&self.archive_path)
    }

    fn set_status(&self, status: TreeStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    /// Re-reads the archive and replaces the tree.
    ///
    /// Blocks while another preparation or mutation is running. Callers that
    /// waited behind a rebuild get its result instead of reading the archive again.
    pub fn prepare(&self) -> Result<Arc<ArchiveNode>, HolderError> {
        let seen = self.generation();
        let mut state = self.state.lock_ignore_poison();
        if state.generation != seen
            && let Some(root) = &state.root
        {
            return Ok(Arc::clone(root));
        }
        self.rebuild(&mut state)
    }

    /// Returns the current tree, preparing it on first access.
    ///
    /// The returned snapshot never changes; after a mutation, call `root()`
    /// again to see the rebuilt tree.
    pub fn root(&self) -> Result<Arc<ArchiveNode>, HolderError> {
        let mut state = self.state.lock_ignore_poison();
        self.ensure_root(&mut state)
    }

    /// Looks up a node in the current tree. The copy has no children.
    pub fn find_node(&self, path: &str) -> Option<ArchiveNode> {
        let root = self.root().ok()?;
        find_node_by_path(&root, path).map(ArchiveNode::without_children)
    }

    fn ensure_root(&self, state: &mut TreeState) -> Result<Arc<ArchiveNode>, HolderError> {
        match &state.root {
            Some(root) => Ok(Arc::clone(root)),
            None => self.rebuild(state),
        }
    }

    fn rebuild(&self, state: &mut TreeState) -> Result<Arc<ArchiveNode>, HolderError> {
        self.set_status(TreeStatus::Preparing);
        let start = std::time::Instant::now();

        let entries = match read_entries(&self.archive_path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("ZipTree::prepare: can't read {}: {}", self.archive_path.display(), e);
                state.root = None;
                state.entry_indices.clear();
                self.set_status(TreeStatus::NotReady);
                return Err(e);
            }
        };

        let mut entry_indices = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            entry_indices.entry(normalize_path(&entry.name)).or_insert(index);
        }
        let entry_count = entries.len();
        let root = Arc::new(build_tree(entries));

        state.root = Some(Arc::clone(&root));
        state.entry_indices = entry_indices;
        state.generation += 1;
        self.generation.store(state.generation, Ordering::Release);
        self.set_status(TreeStatus::Ready);

        log::debug!(
            "ZipTree::prepare: archive={}, entries={}, generation={}, took={}ms",
            self.archive_path.display(),
            entry_count,
            state.generation,
            start.elapsed().as_millis()
        );
        Ok(root)
    }

    /// Appends an empty file or directory entry at `path`, then rebuilds the tree.
    ///
    /// Fails if the path already exists or its parent isn't a directory.
    pub fn add_entry(&self, path: &str, is_dir: bool) -> Result<(), HolderError> {
        let normalized = normalize_path(path);
        if normalized.is_empty() || normalized.split('/').any(|segment| segment == "..") {
            return Err(HolderError::InvalidName(path.to_string()));
        }

        let mut state = self.state.lock_ignore_poison();
        let root = self.ensure_root(&mut state)?;
        if find_node_by_path(&root, &normalized).is_some() {
            return Err(HolderError::AlreadyExists(normalized));
        }
        if let Some(parent) = parent_path(&normalized) {
            match find_node_by_path(&root, parent) {
                Some(node) if node.is_directory => {}
                _ => return Err(HolderError::NotFound(parent.to_string())),
            }
        }

        append_entry(&self.archive_path, &normalized, is_dir)?;
        log::debug!(
            "ZipTree::add_entry: archive={}, path={}, is_dir={}",
            self.archive_path.display(),
            normalized,
            is_dir
        );
        self.rebuild(&mut state)?;
        Ok(())
    }

    /// Extracts a file entry into the scratch folder and returns its path.
    ///
    /// Reuses an earlier extraction of the same entry unless the tree was
    /// rebuilt since.
    pub fn extract(&self, path: &str) -> Result<PathBuf, HolderError> {
        let normalized = normalize_path(path);
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(HolderError::InvalidName(path.to_string()));
        }

        let mut state = self.state.lock_ignore_poison();
        let root = self.ensure_root(&mut state)?;
        let node = find_node_by_path(&root, &normalized).ok_or_else(|| HolderError::NotFound(normalized.clone()))?;
        if node.is_directory {
            return Err(HolderError::NotSupported);
        }

        if let Some((generation, extracted)) = state.extracted.get(&normalized)
            && *generation == state.generation
            && extracted.exists()
        {
            return Ok(extracted.clone());
        }

        let index = *state
            .entry_indices
            .get(&normalized)
            .ok_or_else(|| HolderError::NotFound(normalized.clone()))?;
        let target = self.scratch_dir.join(&normalized);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut archive = ZipArchive::new(BufReader::new(File::open(&self.archive_path)?))?;
        let mut entry = archive.by_index(index)?;
        let mut out = File::create(&target)?;
        let bytes = io::copy(&mut entry, &mut out)?;

        log::debug!(
            "ZipTree::extract: archive={}, entry={}, bytes={}",
            self.archive_path.display(),
            normalized,
            bytes
        );
        let generation = state.generation;
        state.extracted.insert(normalized, (generation, target.clone()));
        Ok(target)
    }

    /// Removes the scratch folder and forgets prior extractions.
    ///
    /// Meant for whoever owns the browsing session, when it ends.
    pub fn cleanup_scratch(&self) -> Result<(), HolderError> {
        let mut state = self.state.lock_ignore_poison();
        state.extracted.clear();
        match fs::remove_dir_all(&self.scratch_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reads the central directory without decompressing anything.
fn read_entries(archive_path: &Path) -> Result<Vec<RawArchiveEntry>, HolderError> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(archive_path)?))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        entries.push(RawArchiveEntry {
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
            size: entry.size(),
            last_modified: zip_time_millis(entry.last_modified()),
        });
    }
    Ok(entries)
}

/// Converts a zip (MS-DOS, local time) timestamp to epoch millis.
fn zip_time_millis(time: zip::DateTime) -> i64 {
    NaiveDate::from_ymd_opt(i32::from(time.year()), u32::from(time.month()), u32::from(time.day()))
        .and_then(|date| date.and_hms_opt(u32::from(time.hour()), u32::from(time.minute()), u32::from(time.second())))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.timestamp_millis())
        .unwrap_or(0)
}

/// Appends one zero-length entry to the archive in place.
fn append_entry(archive_path: &Path, name: &str, is_dir: bool) -> Result<(), HolderError> {
    let file = OpenOptions::new().read(true).write(true).open(archive_path)?;
    let mut writer = ZipWriter::new_append(file)?;
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    if is_dir {
        writer.add_directory(format!("{}/", name), options)?;
    } else {
        writer.start_file(name, options)?;
    }
    writer.finish()?;
    Ok(())
}

/// Shares one `ZipTree` per archive file.
#[derive(Default)]
pub struct ArchiveRegistry {
    trees: Mutex<HashMap<PathBuf, Arc<ZipTree>>>,
}

impl ArchiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `archive_path`, creating it on first use.
    pub fn tree_for(&self, archive_path: &Path, scratch_base: &Path) -> Arc<ZipTree> {
        let key = fs::canonicalize(archive_path).unwrap_or_else(|_| archive_path.to_path_buf());
        let mut trees = self.trees.lock_ignore_poison();
        Arc::clone(
            trees
                .entry(key.clone())
                .or_insert_with(|| Arc::new(ZipTree::new(key, scratch_base))),
        )
    }

    /// Forgets the session for `archive_path` and removes its scratch folder.
    pub fn close(&self, archive_path: &Path) {
        let key = fs::canonicalize(archive_path).unwrap_or_else(|_| archive_path.to_path_buf());
        let removed = self.trees.lock_ignore_poison().remove(&key);
        if let Some(tree) = removed
            && let Err(e) = tree.cleanup_scratch()
        {
            log::warn!("ArchiveRegistry::close: scratch cleanup failed for {}: {}", key.display(), e);
        }
    }

    pub fn open_count(&self) -> usize {
        self.trees.lock_ignore_poison().len()
    }
}
