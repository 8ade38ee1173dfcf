//! Shared collaborators handed to holders at construction.
//!
//! Holders that need settings, the media index, or archive sessions receive an
//! `Arc<HolderContext>`; nothing reaches into global state.

use std::path::Path;
use std::sync::Arc;

use crate::archive::{ArchiveRegistry, is_zip_extension};
use crate::holder::{ArchiveHolder, Holder, LocalHolder};
use crate::listing::extension_of;
use crate::media::{MediaIndex, WalkdirIndex};
use crate::settings::HolderSettings;

pub struct HolderContext {
    pub settings: Arc<HolderSettings>,
    pub index: Arc<dyn MediaIndex>,
    pub archives: ArchiveRegistry,
}

impl HolderContext {
    pub fn new(settings: HolderSettings, index: Arc<dyn MediaIndex>) -> Arc<Self> {
        Arc::new(Self {
            settings: Arc::new(settings),
            index,
            archives: ArchiveRegistry::new(),
        })
    }

    /// Context whose index walks the configured storage roots.
    pub fn with_walkdir_index(settings: HolderSettings) -> Arc<Self> {
        let index = Arc::new(WalkdirIndex::new(settings.effective_storage_roots()));
        Self::new(settings, index)
    }
}

/// Opens the right holder for a real path.
///
/// Zip-family files open as the root of their archive; everything else,
/// including paths that don't exist (yet), becomes a `LocalHolder`.
pub fn open_path(ctx: &HolderContext, path: &Path) -> Holder {
    let is_file = path.metadata().is_ok_and(|m| m.is_file());
    let extension = path
        .file_name()
        .map(|name| extension_of(&name.to_string_lossy()))
        .unwrap_or_default();

    if is_file && is_zip_extension(&extension) {
        let tree = ctx.archives.tree_for(path, &ctx.settings.scratch_base());
        return Arc::new(ArchiveHolder::open_root(tree));
    }
    LocalHolder::shared(path)
}
