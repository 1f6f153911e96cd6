//! Table source adapter: many currencies in one listing.

use std::collections::BTreeSet;

use async_trait::async_trait;
use fxsnap_types::{
    ExtractionError, KNOWN_CURRENCIES, MarkupFetcher, SourceError, SourceTable, TableSource,
};
use tracing::{info, instrument};

use crate::extract::{ExtractorChain, FreeTextStrategy, StructuredTableStrategy};

/// Extraction settings for the table source.
#[derive(Debug, Clone)]
pub struct TableSettings {
    /// Zero-based cell index of the rate in each row
    pub rate_column: usize,
    /// Local-currency label in `<CODE> <amount> = <BASE> <price>` quotes
    pub base_label: String,
    /// Restrict the table strategy to [`KNOWN_CURRENCIES`]
    pub known_currencies_only: bool,
    /// Codes to publish; `None` publishes everything extracted
    pub allow_list: Option<BTreeSet<String>>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            rate_column: 2,
            base_label: "SGD".to_string(),
            known_currencies_only: false,
            allow_list: None,
        }
    }
}

/// Fetches the table source and extracts a [`SourceTable`] from it.
pub struct TableSourceAdapter<F: MarkupFetcher> {
    url: String,
    fetcher: F,
    chain: ExtractorChain,
    allow_list: Option<BTreeSet<String>>,
}

impl<F: MarkupFetcher> TableSourceAdapter<F> {
    /// Builds the default chain: structured table, then free text.
    pub fn new(
        url: impl Into<String>,
        fetcher: F,
        settings: TableSettings,
    ) -> Result<Self, regex::Error> {
        let mut table = StructuredTableStrategy::new(settings.rate_column);
        if settings.known_currencies_only {
            table = table.with_known_codes(KNOWN_CURRENCIES.iter().copied());
        }
        let chain = ExtractorChain::new("table source")
            .with_strategy(table)
            .with_strategy(FreeTextStrategy::new(&settings.base_label)?);

        Ok(Self {
            url: url.into(),
            fetcher,
            chain,
            allow_list: settings.allow_list,
        })
    }

    /// Runs the chain and the allow-list over already-fetched markup.
    ///
    /// An allow-list that filters out every entry is a failure, the same as
    /// finding nothing.
    pub fn extract(&self, markup: &str) -> Result<SourceTable, ExtractionError> {
        let mut table = self.chain.extract(markup)?.table;

        if let Some(allowed) = &self.allow_list {
            table.retain(|code| allowed.contains(code));
            if table.is_empty() {
                return Err(ExtractionError::NoEntriesFound {
                    origin: format!("{} (after allow-list)", self.chain.origin()),
                });
            }
        }

        Ok(table)
    }
}

#[async_trait]
impl<F: MarkupFetcher + 'static> TableSource for TableSourceAdapter<F> {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load_table(&self) -> Result<SourceTable, SourceError> {
        let markup = self.fetcher.fetch(&self.url).await?;
        let table = self.extract(&markup)?;
        info!(codes = table.len(), "loaded table source");
        Ok(table)
    }
}
