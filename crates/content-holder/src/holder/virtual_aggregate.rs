//! Virtual collections whose children come from queries instead of a folder.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::{ContentHolder, Holder, LocalHolder};
use crate::cache::CountCache;
use crate::context::HolderContext;
use crate::listing::{ContentCount, EntryDescriptor, is_hidden_name};
use crate::media::{IndexedFile, MediaCategory};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Which query backs a virtual holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualKind {
    /// Files modified within the configured window, newest first.
    RecentFiles,
    /// The user's bookmark list, in its stored order.
    Bookmarks,
    /// Files of one media category.
    Media(MediaCategory),
}

impl VirtualKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::RecentFiles => "recent",
            Self::Bookmarks => "bookmarks",
            Self::Media(category) => category.label(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RecentFiles => "Recent files",
            Self::Bookmarks => "Bookmarks",
            Self::Media(category) => category.display_name(),
        }
    }

    /// Parses a label as produced by [`VirtualKind::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "recent" => Some(Self::RecentFiles),
            "bookmarks" => Some(Self::Bookmarks),
            other => MediaCategory::from_label(other).map(Self::Media),
        }
    }
}

/// Read-only container computed from the media index or the bookmark list.
pub struct VirtualHolder {
    kind: VirtualKind,
    ctx: Arc<HolderContext>,
    counts: CountCache,
}

impl VirtualHolder {
    pub fn new(kind: VirtualKind, ctx: Arc<HolderContext>) -> Self {
        Self {
            kind,
            ctx,
            counts: CountCache::new(),
        }
    }

    pub fn shared(kind: VirtualKind, ctx: Arc<HolderContext>) -> Holder {
        Arc::new(Self::new(kind, ctx))
    }

    pub fn kind(&self) -> VirtualKind {
        self.kind
    }

    /// Runs the backing query and returns the resulting paths in order.
    fn resolve(&self) -> Vec<PathBuf> {
        match self.kind {
            VirtualKind::RecentFiles => self.recent_files(),
            VirtualKind::Bookmarks => self.bookmarks(),
            VirtualKind::Media(category) => self.media_files(category),
        }
    }

    fn recent_files(&self) -> Vec<PathBuf> {
        let recent = &self.ctx.settings.recent;
        let window = i64::try_from(recent.window_hours)
            .unwrap_or(i64::MAX)
            .saturating_mul(MILLIS_PER_HOUR);
        let since = chrono::Utc::now().timestamp_millis().saturating_sub(window);
        let roots = self.ctx.settings.effective_storage_roots();

        let mut files: Vec<IndexedFile> = self
            .ctx
            .index
            .files_modified_since(since)
            .into_iter()
            .filter(|file| !(recent.exclude_hidden && has_hidden_component(&file.path, &roots)))
            .filter(|file| !recent.excluded_paths.iter().any(|prefix| file.path.starts_with(prefix)))
            .filter(|file| exists(&file.path))
            .collect();

        // Stable, so equal timestamps keep index order
        files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        files.truncate(recent.max_count);
        files.into_iter().map(|file| file.path).collect()
    }

    fn bookmarks(&self) -> Vec<PathBuf> {
        self.ctx
            .settings
            .bookmarks
            .iter()
            .filter(|path| {
                let present = exists(path);
                if !present {
                    log::debug!("VirtualHolder: skipping missing bookmark {}", path.display());
                }
                present
            })
            .cloned()
            .collect()
    }

    fn media_files(&self, category: MediaCategory) -> Vec<PathBuf> {
        self.ctx
            .index
            .files_in_category(category)
            .into_iter()
            .filter(|file| exists(&file.path))
            .map(|file| file.path)
            .collect()
    }
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn count_paths(paths: &[PathBuf]) -> ContentCount {
    let folders = paths.iter().filter(|path| path.is_dir()).count();
    ContentCount {
        files: paths.len() - folders,
        folders,
    }
}

/// True if any component below the containing storage root starts with a dot.
///
/// Components of the root itself don't count, so a storage root that happens
/// to live under a dot-folder still yields visible files.
pub(super) fn has_hidden_component(path: &Path, roots: &[PathBuf]) -> bool {
    let relative = roots
        .iter()
        .filter_map(|root| path.strip_prefix(root).ok())
        .min_by_key(|rest| rest.components().count())
        .unwrap_or(path);

    relative.components().any(|component| match component {
        Component::Normal(name) => is_hidden_name(&name.to_string_lossy()),
        _ => false,
    })
}

impl ContentHolder for VirtualHolder {
    fn describe(&self) -> EntryDescriptor {
        EntryDescriptor::synthetic(format!("virtual://{}", self.kind.label()), self.kind.display_name())
    }

    fn list_content(&self) -> Vec<Holder> {
        let start = std::time::Instant::now();
        let paths = self.resolve();
        self.counts.refresh(count_paths(&paths));
        log::debug!(
            "VirtualHolder::list_content: kind={}, entries={}, took={}ms",
            self.kind.label(),
            paths.len(),
            start.elapsed().as_millis()
        );
        paths.into_iter().map(LocalHolder::shared).collect()
    }

    fn parent(&self) -> Option<Holder> {
        None
    }

    fn content_count(&self) -> ContentCount {
        self.counts.get_or_compute(|| count_paths(&self.resolve()))
    }

    fn is_valid(&self) -> bool {
        true
    }
}
