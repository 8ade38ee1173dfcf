//! Local file system holder implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{ContentHolder, Holder};
use crate::cache::CountCache;
use crate::error::{HolderError, validate_name};
use crate::listing::entry::system_time_millis;
use crate::listing::{ContentCount, EntryDescriptor, extension_of};

/// A holder backed by one path on the real file system.
///
/// Holds nothing but the path and a count cache. Metadata and permissions are
/// read on every `describe()` since other processes may change them.
pub struct LocalHolder {
    path: PathBuf,
    counts: CountCache,
}

impl LocalHolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            counts: CountCache::new(),
        }
    }

    /// Creates a shared holder for `path`.
    pub fn shared(path: impl Into<PathBuf>) -> Holder {
        Arc::new(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Reads direct children as (path, is_dir) pairs.
    fn read_children(&self) -> Result<Vec<(PathBuf, bool)>, HolderError> {
        let mut children = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            // A single unreadable entry shouldn't hide its siblings
            let Ok(entry) = entry else { continue };
            let is_dir = match entry.file_type() {
                Ok(ft) if ft.is_symlink() => fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false),
                Ok(ft) => ft.is_dir(),
                Err(_) => false,
            };
            children.push((entry.path(), is_dir));
        }
        Ok(children)
    }

    fn count_children(&self) -> ContentCount {
        match self.read_children() {
            Ok(children) => count_pairs(&children),
            Err(e) => {
                log::debug!("LocalHolder::content_count: can't read {}: {}", self.path.display(), e);
                ContentCount::default()
            }
        }
    }

    fn create_child(&self, name: &str, is_folder: bool) -> Result<Holder, HolderError> {
        validate_name(name)?;
        let target = self.path.join(name);
        if is_folder {
            fs::create_dir(&target)?;
        } else {
            // create_new fails on an existing file instead of truncating it
            fs::OpenOptions::new().write(true).create_new(true).open(&target)?;
        }
        self.counts.invalidate();
        Ok(Self::shared(target))
    }

    fn rename_to(&self, new_name: &str) -> Result<Holder, HolderError> {
        validate_name(new_name)?;
        let parent = self
            .path
            .parent()
            .ok_or_else(|| HolderError::NotFound(self.path.to_string_lossy().to_string()))?;
        let target = parent.join(new_name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(HolderError::AlreadyExists(target.to_string_lossy().to_string()));
        }
        fs::rename(&self.path, &target)?;
        Ok(Self::shared(target))
    }

    fn delete_path(&self) -> Result<(), HolderError> {
        let metadata = fs::symlink_metadata(&self.path)?;
        if metadata.is_dir() {
            fs::remove_dir_all(&self.path)?;
        } else {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn count_pairs(children: &[(PathBuf, bool)]) -> ContentCount {
    let folders = children.iter().filter(|(_, is_dir)| *is_dir).count();
    ContentCount {
        files: children.len() - folders,
        folders,
    }
}

impl ContentHolder for LocalHolder {
    fn describe(&self) -> EntryDescriptor {
        // Follow symlinks for the folder check, fall back to the link itself when broken
        let metadata = fs::metadata(&self.path).or_else(|_| fs::symlink_metadata(&self.path)).ok();
        let is_folder = metadata.as_ref().is_some_and(|m| m.is_dir());
        let name = self.display_name();
        let can_write = is_writable(&self.path);

        EntryDescriptor {
            unique_path: self.path.to_string_lossy().to_string(),
            extension: if is_folder { String::new() } else { extension_of(&name) },
            display_name: name,
            is_folder,
            last_modified: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(system_time_millis)
                .unwrap_or(0),
            size: match &metadata {
                Some(m) if m.is_file() => m.len(),
                _ => 0,
            },
            can_read: is_readable(&self.path),
            can_write,
            can_add_new_content: is_folder && can_write,
        }
    }

    fn list_content(&self) -> Vec<Holder> {
        let start = std::time::Instant::now();
        let children = match self.read_children() {
            Ok(children) => children,
            Err(e) => {
                log::debug!("LocalHolder::list_content: can't read {}: {}", self.path.display(), e);
                self.counts.refresh(ContentCount::default());
                return Vec::new();
            }
        };

        self.counts.refresh(count_pairs(&children));
        log::debug!(
            "LocalHolder::list_content: path={}, entries={}, took={}ms",
            self.path.display(),
            children.len(),
            start.elapsed().as_millis()
        );
        children.into_iter().map(|(path, _)| Self::shared(path)).collect()
    }

    fn parent(&self) -> Option<Holder> {
        let parent = self.path.parent()?;
        if parent.as_os_str().is_empty() {
            return None;
        }
        Some(Self::shared(parent))
    }

    fn find_file(&self, name: &str) -> Option<Holder> {
        validate_name(name).ok()?;
        let candidate = self.path.join(name);
        fs::symlink_metadata(&candidate).ok()?;
        // Case-insensitive file systems resolve other spellings of the name too
        let exact = fs::read_dir(&self.path)
            .ok()?
            .flatten()
            .any(|entry| entry.file_name() == name);
        exact.then(|| Self::shared(candidate))
    }

    fn content_count(&self) -> ContentCount {
        self.counts.get_or_compute(|| self.count_children())
    }

    fn is_valid(&self) -> bool {
        // symlink_metadata so broken symlinks still count as present
        fs::symlink_metadata(&self.path).is_ok()
    }

    fn create_sub_file(&self, name: &str) -> Option<Holder> {
        self.create_child(name, false)
            .map_err(|e| log::debug!("LocalHolder::create_sub_file: {} in {}: {}", name, self.path.display(), e))
            .ok()
    }

    fn create_sub_folder(&self, name: &str) -> Option<Holder> {
        self.create_child(name, true)
            .map_err(|e| log::debug!("LocalHolder::create_sub_folder: {} in {}: {}", name, self.path.display(), e))
            .ok()
    }

    fn rename(&self, new_name: &str) -> Option<Holder> {
        self.rename_to(new_name)
            .map_err(|e| log::debug!("LocalHolder::rename: {} -> {}: {}", self.path.display(), new_name, e))
            .ok()
    }

    fn delete(&self) -> bool {
        match self.delete_path() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("LocalHolder::delete: {}: {}", self.path.display(), e);
                false
            }
        }
    }

    fn local_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

#[cfg(unix)]
fn check_access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(path_c) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: path_c is a valid NUL-terminated string for the duration of the call
    unsafe { libc::access(path_c.as_ptr(), mode) == 0 }
}

#[cfg(unix)]
pub(crate) fn is_readable(path: &Path) -> bool {
    check_access(path, libc::R_OK)
}

#[cfg(unix)]
pub(crate) fn is_writable(path: &Path) -> bool {
    check_access(path, libc::W_OK)
}

#[cfg(not(unix))]
pub(crate) fn is_readable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

#[cfg(not(unix))]
pub(crate) fn is_writable(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| !m.permissions().readonly())
}
