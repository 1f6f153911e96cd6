//! # FxSnap Types
//!
//! Domain types and port traits for the exchange-rate snapshot service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (RateEntry, SourceTable, Snapshot)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for the query boundary
//! - `error/` - Fetch, extraction, domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    DerivedRate, KNOWN_CURRENCIES, RateEntry, Reference, ReferenceRate, RefreshState, Snapshot,
    SourceTable,
};
pub use dto::*;
pub use error::{
    AppError, DomainError, ExtractionError, FetchError, ReconciliationDegraded, SourceError,
};
pub use ports::{MarkupFetcher, ReferenceSource, TableSource};
