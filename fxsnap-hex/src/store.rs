//! Holds the most recent snapshot.
//!
//! Readers clone an `Arc` under a read lock and never see a partially built
//! snapshot: the scheduler builds the whole value first and swaps the pointer
//! in one write.

use std::sync::{Arc, PoisonError, RwLock};

use fxsnap_types::Snapshot;

#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Starts with the placeholder snapshot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::placeholder())),
        }
    }

    /// Most recently published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replaces the current snapshot. Only the refresh scheduler publishes.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, Arc::clone(&snapshot))
        };
        drop(previous);
        snapshot
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
