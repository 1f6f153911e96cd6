//! # FxSnap Sources
//!
//! Outbound adapters for the snapshot service:
//! - `fetcher` - `MarkupFetcher` implementations (reqwest, static pages)
//! - `extract` - the extractor chain and its strategies
//! - `table_source` / `reference_source` - `TableSource` and `ReferenceSource` adapters
//!
//! Fetching is async; extraction is synchronous and never holds parsed
//! markup across an await point.

pub mod extract;
pub mod fetcher;
pub mod reference_source;
pub mod table_source;

pub use extract::{Extraction, ExtractorChain, QuoteSide};
pub use fetcher::{DEFAULT_USER_AGENT, HttpFetcher, StaticFetcher};
pub use reference_source::{ReferenceSettings, ReferenceSourceAdapter};
pub use table_source::{TableSettings, TableSourceAdapter};
