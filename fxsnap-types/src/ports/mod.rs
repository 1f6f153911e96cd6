//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod fetcher;
mod source;

pub use fetcher::MarkupFetcher;
pub use source::{ReferenceSource, TableSource};
