//! # FxSnap Hex
//!
//! Core pipeline and HTTP adapter for the snapshot service.
//!
//! ## Architecture
//!
//! - `reconciler` - scales table rates by the reference multiplier
//! - `store` - holds the current snapshot, swapped atomically
//! - `scheduler` - runs refresh cycles on an interval and on demand
//! - `service` - application service read by the handlers
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The scheduler is generic over `T: TableSource` and `R: ReferenceSource`,
//! so tests inject in-memory sources.

pub mod inbound;
pub mod reconciler;
pub mod scheduler;
pub mod service;
pub mod store;

#[cfg(test)]
mod service_tests;

pub use reconciler::{DEFAULT_PRECISION, reconcile, snapshot_for_cycle};
pub use scheduler::{RefreshHandle, RefreshScheduler, SchedulerConfig, TriggerError};
pub use service::RateService;
pub use store::SnapshotStore;
