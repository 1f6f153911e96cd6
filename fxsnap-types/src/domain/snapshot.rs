//! The immutable result of one refresh cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rate::DerivedRate;

/// Timestamped result of one reconciliation cycle.
///
/// Fields are private; once built a snapshot is only ever read. A newer cycle
/// supersedes it by publishing a whole new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    cycle: u64,
    timestamp: Option<DateTime<Utc>>,
    rates: Option<BTreeMap<String, DerivedRate>>,
    error: Option<String>,
    warnings: Vec<String>,
}

impl Snapshot {
    /// Served before the first cycle completes.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// A cycle in which the table source succeeded.
    pub fn published(
        cycle: u64,
        timestamp: DateTime<Utc>,
        rates: BTreeMap<String, DerivedRate>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            cycle,
            timestamp: Some(timestamp),
            rates: Some(rates),
            error: None,
            warnings,
        }
    }

    /// A cycle in which the table source failed: no rates, only the error.
    pub fn failed(
        cycle: u64,
        timestamp: DateTime<Utc>,
        error: impl Into<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            cycle,
            timestamp: Some(timestamp),
            rates: None,
            error: Some(error.into()),
            warnings,
        }
    }

    /// Cycle number; 0 for the placeholder.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn rates(&self) -> Option<&BTreeMap<String, DerivedRate>> {
        self.rates.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_placeholder(&self) -> bool {
        self.cycle == 0
    }
}

/// Refresh scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    /// Waiting for the next tick or a manual trigger.
    Idle,
    /// Fetch, extract and reconcile in flight.
    Refreshing,
}
