//! RateService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use fxsnap_types::{
        AppError, ExtractionError, FetchError, RateEntry, ReconciliationDegraded, Reference,
        ReferenceRate, ReferenceSource, RefreshState, SourceError, SourceTable, TableSource,
    };

    use crate::{RateService, RefreshScheduler, SchedulerConfig, SnapshotStore};

    /// Table source whose next outcome is set by the test. Clones share it.
    #[derive(Clone)]
    pub struct MockTable {
        outcome: Arc<Mutex<Result<SourceTable, SourceError>>>,
    }

    impl MockTable {
        pub fn with_rates(entries: &[(&str, Decimal)]) -> Self {
            Self {
                outcome: Arc::new(Mutex::new(Ok(table(entries)))),
            }
        }

        pub fn failing(err: impl Into<SourceError>) -> Self {
            Self {
                outcome: Arc::new(Mutex::new(Err(err.into()))),
            }
        }

        pub fn set(&self, outcome: Result<SourceTable, SourceError>) {
            *self.outcome.lock().unwrap() = outcome;
        }
    }

    #[async_trait]
    impl TableSource for MockTable {
        async fn load_table(&self) -> Result<SourceTable, SourceError> {
            self.outcome.lock().unwrap().clone()
        }
    }

    pub struct MockReference(pub Reference);

    impl MockReference {
        pub fn quoted(rate: Decimal) -> Self {
            Self(Reference::Quoted(ReferenceRate::new(
                RateEntry::new("SGD 100", rate).unwrap(),
            )))
        }

        pub fn missing(reason: &str) -> Self {
            Self(Reference::Missing(ReconciliationDegraded::new(reason)))
        }
    }

    #[async_trait]
    impl ReferenceSource for MockReference {
        async fn load_reference(&self) -> Reference {
            self.0.clone()
        }
    }

    fn table(entries: &[(&str, Decimal)]) -> SourceTable {
        entries
            .iter()
            .map(|(code, rate)| RateEntry::new(*code, *rate).unwrap())
            .collect()
    }

    fn unreachable_table() -> FetchError {
        FetchError::Unreachable {
            url: "https://cashchanger.test/singapore".into(),
            reason: "connection refused".into(),
        }
    }

    fn setup(
        table: MockTable,
        reference: MockReference,
    ) -> (RefreshScheduler<MockTable, MockReference>, RateService, MockTable) {
        let store = Arc::new(SnapshotStore::new());
        let (scheduler, handle) = RefreshScheduler::new(
            table.clone(),
            reference,
            store.clone(),
            SchedulerConfig::default(),
        );
        (scheduler, RateService::new(store, handle), table)
    }

    #[tokio::test]
    async fn test_before_first_cycle_serves_placeholder() {
        let (_scheduler, service, _) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30))]),
            MockReference::quoted(dec!(25.10)),
        );

        let response = service.snapshot();

        assert_eq!(response.cycle, 0);
        assert!(response.last_updated.is_none());
        assert!(response.rates.is_none());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_scaled_rates_end_to_end() {
        let (mut scheduler, service, _) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30)), ("JPY", dec!(0.0091))]),
            MockReference::quoted(dec!(25.10)),
        );

        scheduler.run_cycle().await;

        let snapshot = service.current();
        let rates = snapshot.rates().unwrap();
        assert_eq!(rates["USD"].rate, dec!(32.630000));
        assert_eq!(rates["JPY"].rate, dec!(0.228410));
        assert!(snapshot.error().is_none());
        assert!(snapshot.warnings().is_empty());

        let response = service.snapshot();
        let rates = response.rates.unwrap();
        assert!((rates["USD"] - 32.63).abs() < 1e-9);
        assert!((rates["JPY"] - 0.22841).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_reference_label_publishes_unscaled_with_warning() {
        let (mut scheduler, service, _) = setup(
            MockTable::with_rates(&[("EUR", dec!(1.45))]),
            MockReference::missing("No rate entries found in reference source markup"),
        );

        scheduler.run_cycle().await;

        let response = service.snapshot();
        assert!((response.rates.unwrap()["EUR"] - 1.45).abs() < 1e-9);
        assert!(response.error.is_none());
        assert_eq!(response.warnings.len(), 1);
        assert!(response.warnings[0].contains("reference source markup"));
    }

    #[tokio::test]
    async fn test_table_failure_is_fatal_with_reference_success() {
        let (mut scheduler, service, _) = setup(
            MockTable::failing(unreachable_table()),
            MockReference::quoted(dec!(25.10)),
        );

        scheduler.run_cycle().await;

        let response = service.snapshot();
        assert!(response.rates.is_none());
        assert!(response.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_table_failure_is_fatal_with_reference_failure() {
        let (mut scheduler, service, _) = setup(
            MockTable::failing(ExtractionError::NoEntriesFound {
                origin: "table source".into(),
            }),
            MockReference::missing("timed out"),
        );

        scheduler.run_cycle().await;

        let response = service.snapshot();
        assert!(response.rates.is_none());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_outage_keeps_timestamp_of_failing_cycle() {
        let (mut scheduler, service, table) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30))]),
            MockReference::quoted(dec!(25.10)),
        );
        scheduler.run_cycle().await;
        let good = service.snapshot();

        table.set(Err(unreachable_table().into()));
        scheduler.run_cycle().await;
        let failed = service.snapshot();

        // Reading again later returns the same cycle, not the time of the query.
        let again = service.snapshot();
        assert_eq!(failed, again);
        assert_eq!(failed.cycle, 2);
        assert!(failed.rates.is_none());
        assert!(failed.last_updated >= good.last_updated);

        table.set(Ok(table_with_usd()));
        scheduler.run_cycle().await;
        assert!(service.snapshot().error.is_none());
    }

    fn table_with_usd() -> SourceTable {
        table(&[("USD", dec!(1.31))])
    }

    #[tokio::test]
    async fn test_health_reports_state_and_cycle() {
        let (mut scheduler, service, _) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30))]),
            MockReference::quoted(dec!(25.10)),
        );
        scheduler.run_cycle().await;

        let health = service.health();

        assert_eq!(health.status, "healthy");
        assert_eq!(health.refresh_state, RefreshState::Idle);
        assert_eq!(health.cycle, 1);
    }

    #[tokio::test]
    async fn test_request_refresh_queues() {
        let (_scheduler, service, _) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30))]),
            MockReference::quoted(dec!(25.10)),
        );

        assert!(service.request_refresh().is_ok());
        // A second request collapses into the pending one.
        assert!(service.request_refresh().is_ok());
    }

    #[tokio::test]
    async fn test_request_refresh_without_scheduler() {
        let (scheduler, service, _) = setup(
            MockTable::with_rates(&[("USD", dec!(1.30))]),
            MockReference::quoted(dec!(25.10)),
        );
        drop(scheduler);

        let result = service.request_refresh();

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
