//! Extension trait to ignore mutex poisoning.
//!
//! The holder caches and the archive tree state are plain values that stay
//! consistent even if a thread panicked while holding the lock, so poison is
//! irrelevant for them.

use std::sync::{Mutex, MutexGuard};

pub trait IgnorePoison<T> {
    /// Locks the mutex, ignoring poison.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}
