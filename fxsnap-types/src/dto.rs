//! Data Transfer Objects (DTOs) for the query boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::{RefreshState, Snapshot};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// The current snapshot as served to readers.
///
/// `last_updated` is the time of the cycle that produced the snapshot, not
/// the time of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    /// Cycle number, 0 before the first refresh completes
    pub cycle: u64,
    pub last_updated: Option<DateTime<Utc>>,
    /// Derived rates by code; null when the table source failed
    pub rates: Option<BTreeMap<String, f64>>,
    pub error: Option<String>,
    /// Non-fatal problems of the cycle (degraded reference)
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl From<&Snapshot> for SnapshotResponse {
    fn from(snapshot: &Snapshot) -> Self {
        let rates = snapshot.rates().map(|rates| {
            rates
                .iter()
                .filter_map(|(code, derived)| Some((code.clone(), derived.rate.to_f64()?)))
                .collect()
        });

        Self {
            cycle: snapshot.cycle(),
            last_updated: snapshot.timestamp(),
            rates,
            error: snapshot.error().map(String::from),
            warnings: snapshot.warnings().to_vec(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub refresh_state: RefreshState,
    /// Cycle of the snapshot currently served
    pub cycle: u64,
}

/// Response after requesting a manual refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub status: String,
}
