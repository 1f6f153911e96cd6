//! Reference source adapter: one banknote class used as the multiplier.

use async_trait::async_trait;
use fxsnap_types::{
    ExtractionError, MarkupFetcher, Reference, ReferenceRate, ReferenceSource, SourceError,
};
use tracing::{info, instrument, warn};

use crate::extract::{DenominationStrategy, ExtractorChain, QuoteSide};

/// Which instrument to read from the reference source.
#[derive(Debug, Clone)]
pub struct ReferenceSettings {
    pub currency: String,
    pub denomination: String,
    pub side: QuoteSide,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            currency: "SGD".to_string(),
            denomination: "100".to_string(),
            side: QuoteSide::Buy,
        }
    }
}

pub struct ReferenceSourceAdapter<F: MarkupFetcher> {
    url: String,
    fetcher: F,
    chain: ExtractorChain,
    label: String,
}

impl<F: MarkupFetcher> ReferenceSourceAdapter<F> {
    /// Builds the chain: table rows first, then visible text.
    pub fn new(
        url: impl Into<String>,
        fetcher: F,
        settings: ReferenceSettings,
    ) -> Result<Self, regex::Error> {
        let rows =
            DenominationStrategy::rows(&settings.currency, &settings.denomination, settings.side)?;
        let text =
            DenominationStrategy::text(&settings.currency, &settings.denomination, settings.side)?;
        let label = rows.label().to_string();
        let chain = ExtractorChain::new("reference source")
            .with_strategy(rows)
            .with_strategy(text);

        Ok(Self {
            url: url.into(),
            fetcher,
            chain,
            label,
        })
    }

    /// Finds the reference quote in already-fetched markup.
    pub fn lookup(&self, markup: &str) -> Result<ReferenceRate, ExtractionError> {
        let extraction = self.chain.extract(markup)?;
        extraction
            .table
            .get(&self.label)
            .cloned()
            .map(ReferenceRate::new)
            .ok_or_else(|| ExtractionError::NoEntriesFound {
                origin: self.chain.origin().to_string(),
            })
    }

    async fn fetch_and_lookup(&self) -> Result<ReferenceRate, SourceError> {
        let markup = self.fetcher.fetch(&self.url).await?;
        Ok(self.lookup(&markup)?)
    }
}

#[async_trait]
impl<F: MarkupFetcher + 'static> ReferenceSource for ReferenceSourceAdapter<F> {
    #[instrument(skip(self), fields(url = %self.url, label = %self.label))]
    async fn load_reference(&self) -> Reference {
        match self.fetch_and_lookup().await {
            Ok(rate) => {
                info!(rate = %rate.rate(), "loaded reference rate");
                Reference::Quoted(rate)
            }
            Err(err) => {
                warn!(error = %err, "reference rate unavailable, falling back to unscaled rates");
                Reference::Missing(err.into())
            }
        }
    }
}
