//! Markup fetcher port.
//!
//! Implementations can be HTTP clients, rendered-page tools, canned pages, etc.
//! The extraction layer only ever sees the returned text.

use crate::error::FetchError;

/// Port trait for retrieving raw markup.
#[async_trait::async_trait]
pub trait MarkupFetcher: Send + Sync {
    /// Returns the response body of `url`.
    ///
    /// No retries: a failure is reported for the current cycle only.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
