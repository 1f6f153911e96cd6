//! Free-text strategy: `<CODE> <amount> = <BASE> <price>` quotes in page text.

use fxsnap_types::RateEntry;
use regex::Regex;

use super::{ExtractionStrategy, Page, parse_rate};

/// Recovers per-unit rates from quotes such as `JPY 1000 = SGD 8.715`.
#[derive(Debug, Clone)]
pub struct FreeTextStrategy {
    pattern: Regex,
}

impl FreeTextStrategy {
    /// `base_label` is the local-currency label on the right of `=`, e.g. `SGD`.
    pub fn new(base_label: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"\b([A-Z]{{3}})\s+(\d[\d,]*(?:\.\d+)?)\s*=\s*{}\s*(\d[\d,]*(?:\.\d+)?)",
            regex::escape(base_label)
        ))?;
        Ok(Self { pattern })
    }
}

impl ExtractionStrategy for FreeTextStrategy {
    fn name(&self) -> &'static str {
        "free-text"
    }

    fn extract(&self, page: &Page) -> Vec<RateEntry> {
        self.pattern
            .captures_iter(page.text())
            .filter_map(|caps| {
                let amount = parse_rate(&caps[2])?;
                let price = parse_rate(&caps[3])?;
                let rate = price.checked_div(amount)?;
                RateEntry::new(&caps[1], rate).ok()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn extract(markup: &str) -> Vec<RateEntry> {
        FreeTextStrategy::new("SGD")
            .unwrap()
            .extract(&Page::parse(markup))
    }

    #[test]
    fn test_divides_price_by_amount() {
        let entries = extract(
            r#"<div class="rate"><span>USD 1</span> = <b>SGD 1.282</b></div>
               <div class="rate"><span>JPY 1000</span> = <b>SGD 8.715</b></div>"#,
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code(), "USD");
        assert_eq!(entries[0].rate(), dec!(1.282));
        assert_eq!(entries[1].code(), "JPY");
        assert_eq!(entries[1].rate(), dec!(0.008715));
    }

    #[test]
    fn test_amount_with_thousands_separator() {
        let entries = extract("<p>IDR 10,000 = SGD 0.85</p>");
        assert_eq!(entries[0].rate(), dec!(0.000085));
    }

    #[test]
    fn test_other_base_label_is_ignored() {
        let entries = extract("<p>USD 1 = MYR 4.40</p>");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_zero_amount_is_skipped() {
        let entries = extract("<p>USD 0 = SGD 1.30</p><p>EUR 1 = SGD 1.45</p>");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].code(), "EUR");
    }

    #[test]
    fn test_repeated_codes_are_all_returned_in_order() {
        let entries = extract("<p>USD 1 = SGD 1.30</p><p>USD 1 = SGD 1.31</p>");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].rate(), dec!(1.31));
    }
}
