//! Structured-table strategy: one currency per `<tr>`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use fxsnap_types::RateEntry;
use regex::Regex;
use scraper::Selector;

use super::{ExtractionStrategy, Page, element_text, parse_rate};

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("currency code regex is valid"));

/// Minimum number of cells for a row to be considered a listing.
const MIN_CELLS: usize = 3;

/// Reads field 0 as the currency code and a configured later field as the rate.
#[derive(Debug, Clone)]
pub struct StructuredTableStrategy {
    rate_column: usize,
    known_codes: Option<BTreeSet<String>>,
}

impl StructuredTableStrategy {
    /// `rate_column` is the zero-based cell index holding the rate.
    pub fn new(rate_column: usize) -> Self {
        Self {
            rate_column,
            known_codes: None,
        }
    }

    /// Only accept codes from this list.
    pub fn with_known_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    fn read_row(&self, cells: &[String]) -> Option<RateEntry> {
        if cells.len() < MIN_CELLS {
            return None;
        }
        let code = CODE.captures(&cells[0])?.get(1)?.as_str();
        if let Some(known) = &self.known_codes {
            if !known.contains(code) {
                return None;
            }
        }
        let rate = parse_rate(cells.get(self.rate_column)?)?;
        RateEntry::new(code, rate).ok()
    }
}

impl ExtractionStrategy for StructuredTableStrategy {
    fn name(&self) -> &'static str {
        "structured-table"
    }

    fn extract(&self, page: &Page) -> Vec<RateEntry> {
        let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("td, th")) else {
            return Vec::new();
        };

        page.document()
            .select(&row_sel)
            .filter_map(|row| {
                let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
                self.read_row(&cells)
            })
            .collect()
    }
}
