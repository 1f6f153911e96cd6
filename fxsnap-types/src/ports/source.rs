//! Source ports consumed by the refresh scheduler.

use crate::domain::{Reference, SourceTable};
use crate::error::SourceError;

/// The authoritative many-currency source.
#[async_trait::async_trait]
pub trait TableSource: Send + Sync + 'static {
    /// Fetches and extracts one cycle's table.
    ///
    /// An error here is fatal for the cycle's snapshot.
    async fn load_table(&self) -> Result<SourceTable, SourceError>;
}

/// The single-instrument source providing the multiplier.
#[async_trait::async_trait]
pub trait ReferenceSource: Send + Sync + 'static {
    /// Looks up the reference rate.
    ///
    /// Never fails: every failure is reported as [`Reference::Missing`].
    async fn load_reference(&self) -> Reference;
}
