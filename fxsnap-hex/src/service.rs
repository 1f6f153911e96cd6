//! Rate Application Service
//!
//! Read side of the snapshot pipeline. Handlers talk to this, never to the
//! store or the scheduler directly.

use std::sync::Arc;

use fxsnap_types::{AppError, HealthResponse, RefreshState, Snapshot, SnapshotResponse};

use crate::scheduler::{RefreshHandle, TriggerError};
use crate::store::SnapshotStore;

/// Application service for snapshot reads and refresh requests.
///
/// Cheap to clone; every clone reads the same store.
#[derive(Debug, Clone)]
pub struct RateService {
    store: Arc<SnapshotStore>,
    refresh: RefreshHandle,
}

impl RateService {
    pub fn new(store: Arc<SnapshotStore>, refresh: RefreshHandle) -> Self {
        Self { store, refresh }
    }

    /// Most recent snapshot, as published.
    pub fn current(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    /// Most recent snapshot in its wire shape.
    pub fn snapshot(&self) -> SnapshotResponse {
        SnapshotResponse::from(self.current().as_ref())
    }

    pub fn state(&self) -> RefreshState {
        self.refresh.state()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            refresh_state: self.state(),
            cycle: self.current().cycle(),
        }
    }

    /// Asks the scheduler for an extra cycle. Returns once queued.
    pub fn request_refresh(&self) -> Result<(), AppError> {
        self.refresh.trigger().map_err(|err| match err {
            TriggerError::SchedulerStopped => AppError::Unavailable(err.to_string()),
        })
    }
}
