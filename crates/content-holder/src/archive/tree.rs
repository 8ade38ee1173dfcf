//! In-memory tree over an archive's flat entry list.
//!
//! Nodes own their children; there are no parent pointers. A node's parent is
//! found by trimming the last path segment and looking that path up again,
//! which keeps the tree trivially rebuildable.

use crate::listing::extension_of;

/// One entry as read from the archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArchiveEntry {
    /// Entry name as stored in the archive (directories usually end with `/`).
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    /// Epoch millis; 0 when unknown.
    pub last_modified: i64,
}

/// A file or directory inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveNode {
    /// Slash-joined path from the archive root, no leading or trailing slash.
    /// Empty for the root.
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    pub last_modified: i64,
    /// Lowercase; empty for directories.
    pub extension: String,
    pub children: Vec<ArchiveNode>,
}

impl ArchiveNode {
    fn directory(path: String, name: String, last_modified: i64) -> Self {
        Self {
            path,
            name,
            is_directory: true,
            size: 0,
            last_modified,
            extension: String::new(),
            children: Vec::new(),
        }
    }

    fn root() -> Self {
        Self::directory(String::new(), String::new(), 0)
    }

    pub fn child(&self, name: &str) -> Option<&ArchiveNode> {
        self.children.iter().find(|child| child.name == name)
    }

    fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name == name)
    }

    /// Copy of this node without its children.
    pub fn without_children(&self) -> ArchiveNode {
        ArchiveNode {
            path: self.path.clone(),
            name: self.name.clone(),
            is_directory: self.is_directory,
            size: self.size,
            last_modified: self.last_modified,
            extension: self.extension.clone(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(|child| 1 + child.descendant_count()).sum()
    }
}

/// Normalizes an archive entry name: backslashes to slashes, no leading `./`
/// or `/`, no trailing `/`, no empty or `.` segments.
pub fn normalize_path(name: &str) -> String {
    name.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of the containing directory; `None` for the root itself.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('/').map_or("", |pos| &path[..pos]))
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Builds the node hierarchy from a flat entry list.
///
/// Intermediate directories missing from the archive are synthesized. An
/// explicit directory entry that arrives after its synthesized twin fills in
/// the timestamp. Duplicate entries keep the first occurrence.
pub fn build_tree(entries: impl IntoIterator<Item = RawArchiveEntry>) -> ArchiveNode {
    let mut root = ArchiveNode::root();
    for entry in entries {
        insert_entry(&mut root, &entry);
    }
    root
}

fn insert_entry(root: &mut ArchiveNode, entry: &RawArchiveEntry) {
    let normalized = normalize_path(&entry.name);
    if normalized.is_empty() {
        return;
    }
    let segments: Vec<&str> = normalized.split('/').collect();
    let last = segments.len() - 1;

    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        let is_leaf = depth == last;
        let node_is_dir = !is_leaf || entry.is_dir;

        let index = match current.child_index(segment) {
            Some(index) => {
                let existing = &mut current.children[index];
                if is_leaf && entry.is_dir && existing.is_directory && existing.last_modified == 0 {
                    existing.last_modified = entry.last_modified;
                }
                if !is_leaf && !existing.is_directory {
                    // "a" stored as a file and "a/b" also present: "a" has to be a folder
                    log::debug!("build_tree: promoting file {} to a directory", existing.path);
                    existing.is_directory = true;
                    existing.size = 0;
                    existing.extension = String::new();
                }
                index
            }
            None => {
                let path = segments[..=depth].join("/");
                let node = if node_is_dir {
                    let modified = if is_leaf { entry.last_modified } else { 0 };
                    ArchiveNode::directory(path, segment.to_string(), modified)
                } else {
                    ArchiveNode {
                        path,
                        name: segment.to_string(),
                        is_directory: false,
                        size: entry.size,
                        last_modified: entry.last_modified,
                        extension: extension_of(segment),
                        children: Vec::new(),
                    }
                };
                current.children.push(node);
                current.children.len() - 1
            }
        };
        current = &mut current.children[index];
    }
}

/// Resolves a slash-joined path by walking child names from the root.
///
/// The path is normalized first, so `"a/b/"` and `"./a/b"` find the same node.
pub fn find_node_by_path<'a>(root: &'a ArchiveNode, path: &str) -> Option<&'a ArchiveNode> {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return Some(root);
    }
    normalized
        .split('/')
        .try_fold(root, |node, segment| node.child(segment))
}
