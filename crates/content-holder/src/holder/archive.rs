//! Holder for entries inside a zip archive.
//!
//! An `ArchiveHolder` is just a path into a shared [`ZipTree`]. It never keeps
//! node references, so every call re-resolves its path in the tree that is
//! current at that moment. After the archive is rebuilt, a holder whose path
//! vanished lists empty and reports itself invalid.

use std::path::PathBuf;
use std::sync::Arc;

use super::{ContentHolder, Holder};
use crate::archive::tree::{ArchiveNode, find_node_by_path, join_path, parent_path};
use crate::archive::zip_tree::ZipTree;
use crate::cache::CountCache;
use crate::error::{HolderError, validate_name};
use crate::listing::{ContentCount, EntryDescriptor};

pub struct ArchiveHolder {
    tree: Arc<ZipTree>,
    /// Normalized path inside the archive, empty for the archive root.
    path: String,
    counts: CountCache,
}

impl ArchiveHolder {
    /// Holder for the top level of the archive.
    pub fn open_root(tree: Arc<ZipTree>) -> Self {
        Self::at(tree, String::new())
    }

    fn at(tree: Arc<ZipTree>, path: String) -> Self {
        Self {
            tree,
            path,
            counts: CountCache::new(),
        }
    }

    fn shared_at(&self, path: String) -> Holder {
        Arc::new(Self::at(Arc::clone(&self.tree), path))
    }

    pub fn tree(&self) -> &Arc<ZipTree> {
        &self.tree
    }

    pub fn node_path(&self) -> &str {
        &self.path
    }

    pub fn is_archive_root(&self) -> bool {
        self.path.is_empty()
    }

    fn root_display_name(&self) -> String {
        self.tree
            .archive_path()
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn add_child(&self, name: &str, is_dir: bool) -> Result<Holder, HolderError> {
        validate_name(name)?;
        let child_path = join_path(&self.path, name);
        self.tree.add_entry(&child_path, is_dir)?;
        self.counts.invalidate();
        match self.tree.find_node(&child_path) {
            Some(_) => Ok(self.shared_at(child_path)),
            None => Err(HolderError::NotFound(child_path)),
        }
    }
}

fn count_node_children(node: &ArchiveNode) -> ContentCount {
    let folders = node.children.iter().filter(|child| child.is_directory).count();
    ContentCount {
        files: node.children.len() - folders,
        folders,
    }
}

impl ContentHolder for ArchiveHolder {
    fn describe(&self) -> EntryDescriptor {
        let Some(node) = self.tree.find_node(&self.path) else {
            // Stale: the path is gone from the current tree
            let name = self.path.rsplit('/').next().unwrap_or_default().to_string();
            return EntryDescriptor {
                unique_path: self.path.clone(),
                display_name: if self.is_archive_root() { self.root_display_name() } else { name },
                is_folder: self.is_archive_root(),
                last_modified: 0,
                size: 0,
                extension: String::new(),
                can_read: false,
                can_write: false,
                can_add_new_content: false,
            };
        };

        let writable = node.is_directory && self.tree.is_writable();
        EntryDescriptor {
            unique_path: node.path,
            display_name: if self.is_archive_root() { self.root_display_name() } else { node.name },
            is_folder: node.is_directory,
            last_modified: node.last_modified,
            size: node.size,
            extension: node.extension,
            can_read: true,
            can_write: writable,
            can_add_new_content: writable,
        }
    }

    fn list_content(&self) -> Vec<Holder> {
        let root = match self.tree.root() {
            Ok(root) => root,
            Err(e) => {
                log::debug!("ArchiveHolder::list_content: {} unreadable: {}", self.path, e);
                self.counts.refresh(ContentCount::default());
                return Vec::new();
            }
        };

        let Some(node) = find_node_by_path(&root, &self.path) else {
            log::debug!("ArchiveHolder::list_content: {} no longer in archive", self.path);
            self.counts.refresh(ContentCount::default());
            return Vec::new();
        };

        self.counts.refresh(count_node_children(node));
        node.children
            .iter()
            .map(|child| self.shared_at(child.path.clone()))
            .collect()
    }

    fn parent(&self) -> Option<Holder> {
        parent_path(&self.path).map(|parent| self.shared_at(parent.to_string()))
    }

    fn find_file(&self, name: &str) -> Option<Holder> {
        validate_name(name).ok()?;
        let child_path = join_path(&self.path, name);
        self.tree.find_node(&child_path)?;
        Some(self.shared_at(child_path))
    }

    fn content_count(&self) -> ContentCount {
        self.counts.get_or_compute(|| {
            self.tree
                .root()
                .ok()
                .and_then(|root| find_node_by_path(&root, &self.path).map(count_node_children))
                .unwrap_or_default()
        })
    }

    fn is_valid(&self) -> bool {
        self.tree.find_node(&self.path).is_some()
    }

    fn create_sub_file(&self, name: &str) -> Option<Holder> {
        self.add_child(name, false)
            .map_err(|e| {
                log::warn!(
                    "ArchiveHolder::create_sub_file: {} in {}:{} failed: {}",
                    name,
                    self.tree.archive_path().display(),
                    self.path,
                    e
                )
            })
            .ok()
    }

    fn create_sub_folder(&self, name: &str) -> Option<Holder> {
        self.add_child(name, true)
            .map_err(|e| {
                log::warn!(
                    "ArchiveHolder::create_sub_folder: {} in {}:{} failed: {}",
                    name,
                    self.tree.archive_path().display(),
                    self.path,
                    e
                )
            })
            .ok()
    }

    fn local_path(&self) -> Option<PathBuf> {
        match self.tree.extract(&self.path) {
            Ok(path) => Some(path),
            Err(e) => {
                log::debug!("ArchiveHolder::local_path: can't extract {}: {}", self.path, e);
                None
            }
        }
    }
}
