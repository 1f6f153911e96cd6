//! Domain models for the snapshot service.

pub mod rate;
pub mod snapshot;

pub use rate::{DerivedRate, KNOWN_CURRENCIES, RateEntry, Reference, ReferenceRate, SourceTable};
pub use snapshot::{RefreshState, Snapshot};
