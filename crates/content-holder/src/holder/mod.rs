//! ContentHolder trait for abstracting over backing stores.
//!
//! One trait, several flat implementations:
//! - `LocalHolder`: a path on the real file system
//! - `ArchiveHolder`: a node inside a zip archive
//! - `VirtualHolder`: a collection computed by query (recent files, bookmarks, media)
//! - `RootHolder`: the synthetic top level listing storage roots and collections
//!
//! Expected failures never cross this interface as errors. A missing entry is
//! `None`, an unreadable container lists empty, and a refused create is `None`.
//! All methods except `is_valid` and `describe` on non-local holders may block
//! on I/O; see [`crate::asynchronous`] for running them off the caller's thread.

use std::path::PathBuf;
use std::sync::Arc;

use crate::listing::{ContentCount, EntryDescriptor, ListingPreferences, format_details, sort_holders};

/// Shared handle to any holder implementation.
pub type Holder = Arc<dyn ContentHolder>;

/// Operations every backing store supplies.
pub trait ContentHolder: Send + Sync {
    // ========================================
    // Required: All holders must implement
    // ========================================

    /// Returns a fresh descriptor for this entry.
    fn describe(&self) -> EntryDescriptor;

    /// Lists direct children, unsorted.
    ///
    /// Returns an empty list if the container can't be read. Refreshes the
    /// cached content count.
    fn list_content(&self) -> Vec<Holder>;

    /// Returns the containing entry, or `None` at the root of the backing store.
    fn parent(&self) -> Option<Holder>;

    /// Counts direct children. Cached until the next `list_content`.
    fn content_count(&self) -> ContentCount;

    /// Returns true if the entry still exists in its backing store.
    fn is_valid(&self) -> bool;

    // ========================================
    // Provided: derived from the required methods
    // ========================================

    fn name(&self) -> String {
        self.describe().display_name
    }

    fn unique_path(&self) -> String {
        self.describe().unique_path
    }

    /// Lists children ordered by `prefs`, hiding dot-entries unless `prefs.show_hidden`.
    fn list_sorted_content(&self, prefs: &ListingPreferences) -> Vec<Holder> {
        let start = std::time::Instant::now();
        let content = self.list_content();
        let total = content.len();
        let sorted = sort_holders(content, prefs);
        log::debug!(
            "list_sorted_content: path={}, entries={}, visible={}, took={}ms",
            self.unique_path(),
            total,
            sorted.len(),
            start.elapsed().as_millis()
        );
        sorted
    }

    /// Finds a direct child by exact name.
    fn find_file(&self, name: &str) -> Option<Holder> {
        self.list_content().into_iter().find(|child| child.name() == name)
    }

    /// One-line summary: child counts for folders, size and date for files.
    fn details(&self) -> String {
        let entry = self.describe();
        let count = entry.is_folder.then(|| self.content_count());
        format_details(&entry, count)
    }

    // ========================================
    // Optional: Default to unsupported
    // ========================================

    /// Creates an empty file named `name` in this container.
    ///
    /// Returns `None` if it already exists, the holder doesn't support
    /// creation, or the write fails. Never overwrites.
    fn create_sub_file(&self, name: &str) -> Option<Holder> {
        let _ = name;
        None
    }

    /// Creates a folder named `name` in this container. Same contract as `create_sub_file`.
    fn create_sub_folder(&self, name: &str) -> Option<Holder> {
        let _ = name;
        None
    }

    /// Renames this entry within its parent. Returns the renamed entry.
    fn rename(&self, new_name: &str) -> Option<Holder> {
        let _ = new_name;
        None
    }

    /// Deletes this entry (folders recursively). Returns true on success.
    fn delete(&self) -> bool {
        false
    }

    /// Real file system path for opening the content, if there is one.
    ///
    /// Archive members are extracted to a scratch folder first.
    fn local_path(&self) -> Option<PathBuf> {
        None
    }
}

// Implementations
mod archive;
pub(crate) mod local;
mod root;
mod virtual_aggregate;

pub use archive::ArchiveHolder;
pub use local::LocalHolder;
pub use root::RootHolder;
pub use virtual_aggregate::{VirtualHolder, VirtualKind};

#[cfg(test)]
mod archive_test;
#[cfg(test)]
mod virtual_aggregate_test;
