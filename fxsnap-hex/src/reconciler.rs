//! Reconciler: table-source rates scaled by the reference multiplier.
//!
//! The table source is authoritative. When it failed, the cycle publishes its
//! error and no rates, whatever happened to the reference source. When only
//! the reference failed, rates pass through unscaled with a warning.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fxsnap_types::{DerivedRate, DomainError, Reference, Snapshot, SourceError, SourceTable};
use rust_decimal::RoundingStrategy;

/// Decimal places of published rates.
pub const DEFAULT_PRECISION: u32 = 6;

/// Multiplies every table entry by the reference multiplier and rounds
/// half away from zero to `precision` places.
///
/// Produces exactly one derived rate per table code.
pub fn reconcile(
    table: &SourceTable,
    reference: &Reference,
    precision: u32,
) -> Result<BTreeMap<String, DerivedRate>, DomainError> {
    let multiplier = reference.multiplier();

    table
        .iter()
        .map(|entry| {
            let code = entry.code().to_string();
            let rate = entry
                .rate()
                .checked_mul(multiplier)
                .ok_or_else(|| DomainError::RateOverflow { code: code.clone() })?
                .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
            Ok((code.clone(), DerivedRate { code, rate }))
        })
        .collect()
}

/// Builds the snapshot of one cycle from both source outcomes.
pub fn snapshot_for_cycle(
    cycle: u64,
    timestamp: DateTime<Utc>,
    table: Result<SourceTable, SourceError>,
    reference: &Reference,
    precision: u32,
) -> Snapshot {
    let table = match table {
        Ok(table) => table,
        Err(err) => {
            return Snapshot::failed(cycle, timestamp, format!("Table source failed: {err}"), vec![]);
        }
    };

    match reconcile(&table, reference, precision) {
        Ok(rates) => {
            let warnings = reference
                .degraded()
                .map(ToString::to_string)
                .into_iter()
                .collect();
            Snapshot::published(cycle, timestamp, rates, warnings)
        }
        Err(err) => Snapshot::failed(cycle, timestamp, err.to_string(), vec![]),
    }
}
