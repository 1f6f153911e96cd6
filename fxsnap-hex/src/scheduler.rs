//! Refresh scheduler.
//!
//! Runs one cycle immediately on start, then on a fixed interval. Manual
//! triggers run an extra cycle without moving the interval. Cycles never
//! overlap: the loop finishes a cycle before it looks at the next tick or
//! trigger, and at most one pending trigger is kept.
//!
//! Each load runs in its own task. A source that panics fails its half of
//! the cycle the same way a fetch error would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use fxsnap_types::{Reference, ReferenceSource, RefreshState, Snapshot, SourceError, TableSource};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{Instrument, Span, error, field, info, instrument, warn};

use crate::reconciler::{DEFAULT_PRECISION, snapshot_for_cycle};
use crate::store::SnapshotStore;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between scheduled cycles
    pub interval: Duration,
    /// Decimal places of published rates
    pub precision: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            precision: DEFAULT_PRECISION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("Refresh scheduler is not running")]
    SchedulerStopped,
}

/// Cloneable handle for requesting cycles and reading the scheduler state.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    triggers: mpsc::Sender<()>,
    refreshing: Arc<AtomicBool>,
}

impl RefreshHandle {
    /// Requests an extra cycle.
    ///
    /// Requests made while one is already pending collapse into it.
    pub fn trigger(&self) -> Result<(), TriggerError> {
        match self.triggers.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => Ok(()),
            Err(TrySendError::Closed(())) => Err(TriggerError::SchedulerStopped),
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.refreshing.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }
}

/// Marks a cycle in progress; clears the flag on drop so an aborted cycle
/// does not leave the service reporting `refreshing`.
struct RefreshingGuard<'a>(&'a AtomicBool);

impl<'a> RefreshingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefreshScheduler<T: TableSource, R: ReferenceSource> {
    table: Arc<T>,
    reference: Arc<R>,
    store: Arc<SnapshotStore>,
    config: SchedulerConfig,
    triggers: mpsc::Receiver<()>,
    refreshing: Arc<AtomicBool>,
    cycle: u64,
}

impl<T: TableSource, R: ReferenceSource> RefreshScheduler<T, R> {
    pub fn new(
        table: T,
        reference: R,
        store: Arc<SnapshotStore>,
        config: SchedulerConfig,
    ) -> (Self, RefreshHandle) {
        let (tx, rx) = mpsc::channel(1);
        let refreshing = Arc::new(AtomicBool::new(false));

        let handle = RefreshHandle {
            triggers: tx,
            refreshing: Arc::clone(&refreshing),
        };
        let scheduler = Self {
            table: Arc::new(table),
            reference: Arc::new(reference),
            store,
            config,
            triggers: rx,
            refreshing,
            cycle: 0,
        };

        (scheduler, handle)
    }

    /// Fetches both sources concurrently, reconciles and publishes.
    ///
    /// Source failures end up in the snapshot; this never fails.
    #[instrument(skip(self), fields(cycle = field::Empty))]
    pub async fn run_cycle(&mut self) -> Arc<Snapshot> {
        self.cycle += 1;
        Span::current().record("cycle", self.cycle);
        let refreshing = Arc::clone(&self.refreshing);
        let _guard = RefreshingGuard::enter(&refreshing);

        let table = Arc::clone(&self.table);
        let reference = Arc::clone(&self.reference);
        let (table, reference) = tokio::join!(
            tokio::spawn(async move { table.load_table().await }.in_current_span()),
            tokio::spawn(async move { reference.load_reference().await }.in_current_span()),
        );
        let table = table.unwrap_or_else(|err| Err(task_failed("table source", err)));
        let reference = reference
            .unwrap_or_else(|err| Reference::Missing(task_failed("reference source", err).into()));

        if let Err(err) = &table {
            error!(error = %err, "table source failed, publishing error snapshot");
        }
        if let Some(degraded) = reference.degraded() {
            warn!(reason = %degraded.reason, "reconciling without reference rate");
        }

        let snapshot = snapshot_for_cycle(
            self.cycle,
            Utc::now(),
            table,
            &reference,
            self.config.precision,
        );
        let published = self.store.publish(snapshot);

        info!(
            rates = published.rates().map_or(0, |rates| rates.len()),
            failed = published.error().is_some(),
            "published snapshot"
        );
        published
    }

    /// Runs until the task is aborted.
    pub async fn run(mut self) {
        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut accepting_triggers = true;

        info!(interval = ?self.config.interval, "refresh scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                received = self.triggers.recv(), if accepting_triggers => {
                    if received.is_none() {
                        // Every handle is gone; keep the interval running.
                        accepting_triggers = false;
                        continue;
                    }
                    info!("manual refresh requested");
                }
            }

            self.run_cycle().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

fn task_failed(origin: &str, err: JoinError) -> SourceError {
    let reason = if err.is_panic() {
        "panicked".to_string()
    } else {
        err.to_string()
    };
    SourceError::TaskFailed {
        origin: origin.to_string(),
        reason,
    }
}
