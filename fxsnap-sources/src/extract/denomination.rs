//! Denomination strategy: buy/sell quote for one banknote class.
//!
//! Matches `<CURRENCY> <DENOMINATION>[-range] ... <buy> <sell>`, e.g.
//! `Singapore SGD 100-50 25.05 25.20`, and keys the entry by the label
//! `SGD 100`. Quotes are the first two adjacent decimal tokens after the
//! label; integers in between (dates, counts) are skipped.

use fxsnap_types::RateEntry;
use regex::Regex;
use scraper::Selector;

use super::{ExtractionStrategy, Page, element_text, parse_rate};

/// Which of the two adjacent quote fields becomes the rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteSide {
    #[default]
    Buy,
    Sell,
}

impl std::str::FromStr for QuoteSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown quote side {other:?}, expected buy or sell")),
        }
    }
}

/// Tokens allowed between the label and the quotes.
const MAX_SKIPPED: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Each `<tr>`, cells joined by spaces.
    Rows,
    /// The page's visible text.
    Text,
}

#[derive(Debug, Clone)]
pub struct DenominationStrategy {
    label: String,
    pattern: Regex,
    side: QuoteSide,
    scope: Scope,
}

impl DenominationStrategy {
    /// Looks for the label inside table rows.
    pub fn rows(currency: &str, denomination: &str, side: QuoteSide) -> Result<Self, regex::Error> {
        Self::build(currency, denomination, side, Scope::Rows)
    }

    /// Looks for the label anywhere in the visible text.
    pub fn text(currency: &str, denomination: &str, side: QuoteSide) -> Result<Self, regex::Error> {
        Self::build(currency, denomination, side, Scope::Text)
    }

    fn build(
        currency: &str,
        denomination: &str,
        side: QuoteSide,
        scope: Scope,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}\s*{}(?:\s*[-/]\s*\d+)?\s+(?:\S+\s+){{0,{MAX_SKIPPED}}}?(\d[\d,]*\.\d+)\s+(\d[\d,]*\.\d+)",
            regex::escape(currency),
            regex::escape(denomination)
        ))?;
        Ok(Self {
            label: denomination_label(currency, denomination),
            pattern,
            side,
            scope,
        })
    }

    /// Key under which the quote is reported.
    pub fn label(&self) -> &str {
        &self.label
    }

    fn quote(&self, haystack: &str) -> Option<RateEntry> {
        let caps = self.pattern.captures(haystack)?;
        let field = match self.side {
            QuoteSide::Buy => &caps[1],
            QuoteSide::Sell => &caps[2],
        };
        RateEntry::new(self.label.as_str(), parse_rate(field)?).ok()
    }
}

/// Label for a denomination, e.g. `SGD 100`.
fn denomination_label(currency: &str, denomination: &str) -> String {
    format!("{currency} {denomination}")
}

impl ExtractionStrategy for DenominationStrategy {
    fn name(&self) -> &'static str {
        match self.scope {
            Scope::Rows => "denomination-rows",
            Scope::Text => "denomination-text",
        }
    }

    fn extract(&self, page: &Page) -> Vec<RateEntry> {
        match self.scope {
            Scope::Text => self.quote(page.text()).into_iter().collect(),
            Scope::Rows => {
                let (Ok(row_sel), Ok(cell_sel)) =
                    (Selector::parse("tr"), Selector::parse("td, th"))
                else {
                    return Vec::new();
                };
                page.document()
                    .select(&row_sel)
                    .filter_map(|row| {
                        let line = row
                            .select(&cell_sel)
                            .map(|c| element_text(&c))
                            .collect::<Vec<_>>()
                            .join(" ");
                        self.quote(&line)
                    })
                    .collect()
            }
        }
    }
}
