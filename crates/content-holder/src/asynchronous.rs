//! Async wrappers that run blocking holder calls on tokio's blocking pool.
//!
//! Holder operations do synchronous I/O. Async callers use these so a slow
//! listing (a large folder, a network mount, an archive rebuild) never stalls
//! the runtime's worker threads.

use crate::holder::Holder;
use crate::listing::{ContentCount, ListingPreferences};

/// `list_sorted_content` on the blocking pool. A panicked task yields an empty listing.
pub async fn list_sorted_content_async(holder: Holder, prefs: ListingPreferences) -> Vec<Holder> {
    let path = holder.unique_path();
    match tokio::task::spawn_blocking(move || holder.list_sorted_content(&prefs)).await {
        Ok(content) => content,
        Err(e) => {
            log::error!("list_sorted_content_async: listing task for {} failed: {}", path, e);
            Vec::new()
        }
    }
}

/// `content_count` on the blocking pool. A panicked task yields a zero count.
pub async fn content_count_async(holder: Holder) -> ContentCount {
    let path = holder.unique_path();
    match tokio::task::spawn_blocking(move || holder.content_count()).await {
        Ok(count) => count,
        Err(e) => {
            log::error!("content_count_async: count task for {} failed: {}", path, e);
            ContentCount::default()
        }
    }
}
