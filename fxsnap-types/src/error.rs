//! Error types for the snapshot service.

use rust_decimal::Decimal;

/// Domain-level errors (invariant violations on rate values).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?}")]
    InvalidCode(String),

    #[error("Rate for {code} must be positive, got {rate}")]
    NonPositiveRate { code: String, rate: Decimal },

    #[error("Derived rate for {code} overflows")]
    RateOverflow { code: String },
}

/// Failure to retrieve markup from a source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Timeout, DNS or connection failure.
    #[error("{url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("{url} returned HTTP {code}")]
    HttpStatus { url: String, code: u16 },
}

/// Failure to turn markup into rate entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("No rate entries found in {origin} markup")]
    NoEntriesFound { origin: String },
}

/// Any failure of a source adapter for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The load panicked or was cancelled before producing a result.
    #[error("{origin} task failed: {reason}")]
    TaskFailed { origin: String, reason: String },
}

/// Non-fatal: the reference multiplier is unavailable and rates pass through unscaled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Reference rate unavailable, publishing unscaled rates: {reason}")]
pub struct ReconciliationDegraded {
    pub reason: String,
}

impl ReconciliationDegraded {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<SourceError> for ReconciliationDegraded {
    fn from(err: SourceError) -> Self {
        Self::new(err.to_string())
    }
}

/// Application-level errors (for HTTP responses).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}
