//! Per-holder content count cache.
//!
//! Each holder owns one `CountCache`. Listing the holder bumps the generation,
//! so a count computed before the latest listing is never served again.

use std::sync::Mutex;

use crate::ignore_poison::IgnorePoison;
use crate::listing::ContentCount;

#[derive(Default)]
struct CountState {
    generation: u64,
    /// Count and the generation it was computed for.
    cached: Option<(u64, ContentCount)>,
}

/// Cached `ContentCount` tied to a generation counter.
#[derive(Default)]
pub struct CountCache {
    state: Mutex<CountState>,
}

impl CountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached count by moving to a new generation.
    pub fn invalidate(&self) {
        let mut state = self.state.lock_ignore_poison();
        state.generation += 1;
        state.cached = None;
    }

    /// Starts a new generation and records `count` for it.
    ///
    /// Called with the count derived from a fresh listing.
    pub fn refresh(&self, count: ContentCount) {
        let mut state = self.state.lock_ignore_poison();
        state.generation += 1;
        state.cached = Some((state.generation, count));
    }

    /// Returns the cached count if it belongs to the current generation.
    pub fn get(&self) -> Option<ContentCount> {
        let state = self.state.lock_ignore_poison();
        match state.cached {
            Some((generation, count)) if generation == state.generation => Some(count),
            _ => None,
        }
    }

    /// Returns the cached count, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held. If the generation moved while it
    /// ran, the result is returned but not stored.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> ContentCount) -> ContentCount {
        let generation = {
            let state = self.state.lock_ignore_poison();
            if let Some((cached_generation, count)) = state.cached
                && cached_generation == state.generation
            {
                return count;
            }
            state.generation
        };

        let count = compute();

        let mut state = self.state.lock_ignore_poison();
        if state.generation == generation {
            state.cached = Some((generation, count));
        }
        count
    }

    pub fn generation(&self) -> u64 {
        self.state.lock_ignore_poison().generation
    }
}
