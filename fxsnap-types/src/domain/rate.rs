//! Rate values as extracted from sources and as derived by reconciliation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ReconciliationDegraded};

/// Codes accepted by the structured-table strategy when its allow-list is enabled.
pub const KNOWN_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "HKD", "MYR", "THB", "IDR", "KRW",
    "TWD", "NZD", "INR", "PHP", "VND",
];

/// Returns true for `USD`-style codes and `SGD 100`-style denomination labels.
fn is_valid_code(code: &str) -> bool {
    let Some((iso, label)) = code.split_at_checked(3) else {
        return false;
    };
    if !iso.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match label.strip_prefix(' ') {
        None => label.is_empty(),
        Some(denomination) => {
            !denomination.is_empty() && !denomination.contains(char::is_whitespace)
        }
    }
}

/// A single positive rate keyed by currency code or denomination label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    code: String,
    rate: Decimal,
}

impl RateEntry {
    /// Creates a validated entry. The rate must be strictly positive.
    pub fn new(code: impl Into<String>, rate: Decimal) -> Result<Self, DomainError> {
        let code = code.into();
        if !is_valid_code(&code) {
            return Err(DomainError::InvalidCode(code));
        }
        if rate <= Decimal::ZERO {
            return Err(DomainError::NonPositiveRate { code, rate });
        }
        Ok(Self { code, rate })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

/// Entries from one source for one fetch cycle, unique by code.
///
/// Inserting a code that is already present replaces it: the last
/// extracted row for a code wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    entries: BTreeMap<String, RateEntry>,
}

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the one it replaced.
    pub fn insert(&mut self, entry: RateEntry) -> Option<RateEntry> {
        self.entries.insert(entry.code.clone(), entry)
    }

    pub fn get(&self, code: &str) -> Option<&RateEntry> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateEntry> {
        self.entries.values()
    }

    /// Keeps only the entries whose code satisfies the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|code, _| keep(code));
    }
}

impl FromIterator<RateEntry> for SourceTable {
    fn from_iter<I: IntoIterator<Item = RateEntry>>(iter: I) -> Self {
        let mut table = SourceTable::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// The reference source's value for its designated instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRate(RateEntry);

impl ReferenceRate {
    pub fn new(entry: RateEntry) -> Self {
        Self(entry)
    }

    pub fn label(&self) -> &str {
        self.0.code()
    }

    pub fn rate(&self) -> Decimal {
        self.0.rate()
    }
}

/// Outcome of a reference lookup for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Quoted(ReferenceRate),
    /// Degraded mode: reconciliation uses a multiplier of one.
    Missing(ReconciliationDegraded),
}

impl Reference {
    /// Multiplier applied to every table entry.
    pub fn multiplier(&self) -> Decimal {
        match self {
            Reference::Quoted(rate) => rate.rate(),
            Reference::Missing(_) => Decimal::ONE,
        }
    }

    pub fn degraded(&self) -> Option<&ReconciliationDegraded> {
        match self {
            Reference::Quoted(_) => None,
            Reference::Missing(reason) => Some(reason),
        }
    }
}

/// A published rate: table rate times reference multiplier, rounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRate {
    pub code: String,
    pub rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_accepts_iso_code_and_denomination_label() {
        assert!(RateEntry::new("USD", dec!(1.30)).is_ok());
        assert!(RateEntry::new("SGD 100", dec!(25.10)).is_ok());
        assert!(RateEntry::new("SGD 100-50", dec!(25.10)).is_ok());
    }

    #[test]
    fn test_entry_rejects_bad_codes() {
        for code in ["", "us", "usd", "USDX", "US", "SGD ", "SGD 1 00", "€UR"] {
            let result = RateEntry::new(code, dec!(1));
            assert!(
                matches!(result, Err(DomainError::InvalidCode(_))),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_entry_rejects_non_positive_rate() {
        assert!(matches!(
            RateEntry::new("USD", dec!(0)),
            Err(DomainError::NonPositiveRate { .. })
        ));
        assert!(matches!(
            RateEntry::new("USD", dec!(-1.2)),
            Err(DomainError::NonPositiveRate { .. })
        ));
    }

    #[test]
    fn test_table_last_write_wins() {
        let table: SourceTable = [
            RateEntry::new("USD", dec!(1.30)).unwrap(),
            RateEntry::new("JPY", dec!(0.0091)).unwrap(),
            RateEntry::new("USD", dec!(1.31)).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("USD").unwrap().rate(), dec!(1.31));
    }

    #[test]
    fn test_table_retain() {
        let mut table: SourceTable = [
            RateEntry::new("USD", dec!(1.30)).unwrap(),
            RateEntry::new("JPY", dec!(0.0091)).unwrap(),
        ]
        .into_iter()
        .collect();
        table.retain(|code| code == "JPY");
        assert!(table.get("USD").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_reference_multiplier_is_one() {
        let missing = Reference::Missing(ReconciliationDegraded::new("label not found"));
        assert_eq!(missing.multiplier(), Decimal::ONE);
        assert!(missing.degraded().is_some());

        let quoted =
            Reference::Quoted(ReferenceRate::new(RateEntry::new("SGD 100", dec!(25.10)).unwrap()));
        assert_eq!(quoted.multiplier(), dec!(25.10));
        assert!(quoted.degraded().is_none());
    }
}
