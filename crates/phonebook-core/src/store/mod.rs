// # Record Store
//
// Holds the snapshot that readers render from.
//
// ## Concurrency
//
// The only mutable state is the `Arc<Snapshot>` pointer behind a `RwLock`.
// `swap()` takes the write lock just long enough to replace the pointer and
// `read()` takes the read lock just long enough to clone it. Readers keep
// rendering from the snapshot they got even while a newer one is published,
// which is safe because snapshots are never modified after construction.

use crate::entry::Snapshot;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Concurrency-safe holder of the current snapshot
///
/// # Example
///
/// ```rust
/// use phonebook_core::entry::{Entry, Snapshot};
/// use phonebook_core::store::RecordStore;
///
/// let store = RecordStore::new();
/// assert!(store.read().is_empty());
///
/// store.swap(Snapshot::new(vec![Entry::new("Alice", "Smith", "AS1", "100")]));
/// assert_eq!(store.read().len(), 1);
/// ```
#[derive(Debug)]
pub struct RecordStore {
    current: RwLock<Arc<Snapshot>>,
}

impl RecordStore {
    /// Create a store holding the empty snapshot
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Publish a new snapshot, returning the one it replaced
    pub fn swap(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let entries = next.len();
        // A panicking writer cannot leave a half-replaced Arc behind, so a
        // poisoned lock still guards a valid snapshot.
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        debug!("Published snapshot with {} entries (previous: {})", entries, previous.len());
        previous
    }

    /// Current snapshot
    pub fn read(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
