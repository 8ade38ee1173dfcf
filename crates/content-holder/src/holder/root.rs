//! Synthetic top level: storage roots followed by the virtual collections.

use std::sync::Arc;

use super::{ContentHolder, Holder, LocalHolder, VirtualHolder, VirtualKind};
use crate::cache::CountCache;
use crate::context::HolderContext;
use crate::listing::{ContentCount, EntryDescriptor};
use crate::media::MediaCategory;

pub struct RootHolder {
    ctx: Arc<HolderContext>,
    counts: CountCache,
}

impl RootHolder {
    pub fn new(ctx: Arc<HolderContext>) -> Self {
        Self {
            ctx,
            counts: CountCache::new(),
        }
    }

    pub fn shared(ctx: Arc<HolderContext>) -> Holder {
        Arc::new(Self::new(ctx))
    }

    fn collections() -> impl Iterator<Item = VirtualKind> {
        [VirtualKind::Bookmarks, VirtualKind::RecentFiles]
            .into_iter()
            .chain(MediaCategory::ALL.into_iter().map(VirtualKind::Media))
    }
}

impl ContentHolder for RootHolder {
    fn describe(&self) -> EntryDescriptor {
        EntryDescriptor::synthetic("root://", "Storage")
    }

    fn list_content(&self) -> Vec<Holder> {
        let mut children: Vec<Holder> = self
            .ctx
            .settings
            .effective_storage_roots()
            .into_iter()
            .filter(|root| root.is_dir())
            .map(LocalHolder::shared)
            .collect();
        children.extend(Self::collections().map(|kind| VirtualHolder::shared(kind, Arc::clone(&self.ctx))));

        // Every child is a container
        self.counts.refresh(ContentCount {
            files: 0,
            folders: children.len(),
        });
        children
    }

    fn parent(&self) -> Option<Holder> {
        None
    }

    fn content_count(&self) -> ContentCount {
        self.counts.get_or_compute(|| {
            let roots = self
                .ctx
                .settings
                .effective_storage_roots()
                .iter()
                .filter(|root| root.is_dir())
                .count();
            ContentCount {
                files: 0,
                folders: roots + Self::collections().count(),
            }
        })
    }

    fn is_valid(&self) -> bool {
        true
    }
}
