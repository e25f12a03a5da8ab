//! Scoped display handles.
//!
//! The browser-era engine leaked object URLs unless every exit path revoked
//! them. Here that lifetime is explicit: a [`HandleStore`] issues a
//! [`DisplayHandle`] for each bitmap put on screen, and dropping the handle
//! revokes it in the store. The session replaces its handle whenever the
//! source bitmap is superseded (new file, crop commit) and on teardown, so
//! release happens on every exit path including error paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::trace;

#[derive(Debug, Default)]
struct StoreInner {
    next_id: AtomicU64,
    live: Mutex<HashSet<u64>>,
}

/// Registry of live display handles.
///
/// Cloning shares the registry; the session and its tests observe the same
/// live set.
#[derive(Debug, Clone, Default)]
pub struct HandleStore {
    inner: Arc<StoreInner>,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle for a bitmap going on display.
    pub fn acquire(&self) -> DisplayHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        trace!(id, "display handle acquired");
        DisplayHandle {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of handles currently live.
    pub fn live_count(&self) -> usize {
        self.inner
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a specific handle id is still live.
    pub fn is_live(&self, id: u64) -> bool {
        self.inner
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

/// A scoped handle for a bitmap on display; revoked on drop.
#[derive(Debug)]
pub struct DisplayHandle {
    id: u64,
    store: Weak<StoreInner>,
}

impl DisplayHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut live) = inner.live.lock() {
                live.remove(&self.id);
                trace!(id = self.id, "display handle released");
            }
        }
    }
}
