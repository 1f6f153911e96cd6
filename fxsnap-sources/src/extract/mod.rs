//! Extractor chain: ordered strategies turning one page into a [`SourceTable`].
//!
//! Strategies run in priority order and the chain stops at the first one that
//! yields at least one entry. Rows are then folded into a table where the
//! last row seen for a code wins. A page on which no strategy matches is an
//! [`ExtractionError::NoEntriesFound`], never an empty table.

mod denomination;
mod table;
mod text;

use std::cell::OnceCell;
use std::str::FromStr;
use std::sync::LazyLock;

use fxsnap_types::{ExtractionError, RateEntry, SourceTable};
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use tracing::debug;

pub use denomination::{DenominationStrategy, QuoteSide};
pub use table::StructuredTableStrategy;
pub use text::FreeTextStrategy;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number regex is valid"));

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A parsed page handed to each strategy.
///
/// Holds a `scraper::Html`, which is `!Send`: build and drop it inside
/// synchronous code, never across an `.await`.
pub struct Page {
    document: Html,
    text: OnceCell<String>,
}

impl Page {
    pub fn parse(markup: &str) -> Self {
        Self {
            document: Html::parse_document(markup),
            text: OnceCell::new(),
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Visible text, whitespace-normalized, text nodes joined by single spaces.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| visible_text(&self.document))
    }
}

fn visible_text(document: &Html) -> String {
    let mut words = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

/// Text of an element with whitespace collapsed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a numeric field: thousands separators and spaces are dropped and the
/// first decimal token is taken. Non-positive and unparseable fields yield `None`.
pub(crate) fn parse_rate(field: &str) -> Option<Decimal> {
    let cleaned: String = field
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let token = NUMBER.find(&cleaned)?;
    Decimal::from_str(token.as_str())
        .ok()
        .filter(|rate| *rate > Decimal::ZERO)
}

/// One way of reading rate rows out of a page.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Entries in document order; may contain repeated codes.
    fn extract(&self, page: &Page) -> Vec<RateEntry>;
}

/// Result of a successful chain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Name of the strategy that produced the table.
    pub strategy: &'static str,
    pub table: SourceTable,
}

/// Ordered, short-circuiting set of strategies for one source.
pub struct ExtractorChain {
    origin: String,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ExtractorChain {
    /// Creates an empty chain. `origin` names the source in errors and logs.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy with lower priority than those already added.
    pub fn with_strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn extract(&self, markup: &str) -> Result<Extraction, ExtractionError> {
        let page = Page::parse(markup);

        for strategy in &self.strategies {
            let rows = strategy.extract(&page);
            if rows.is_empty() {
                debug!(origin = %self.origin, strategy = strategy.name(), "strategy found nothing");
                continue;
            }

            let found = rows.len();
            let table: SourceTable = rows.into_iter().collect();
            debug!(
                origin = %self.origin,
                strategy = strategy.name(),
                rows = found,
                codes = table.len(),
                "extracted rates"
            );
            return Ok(Extraction {
                strategy: strategy.name(),
                table,
            });
        }

        Err(ExtractionError::NoEntriesFound {
            origin: self.origin.clone(),
        })
    }
}
