//! # FxSnap Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the HTTP fetcher and both source adapters
//! - Spawn the refresh scheduler
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fxsnap_hex::{RateService, RefreshScheduler, SnapshotStore, inbound::HttpServer};
use fxsnap_sources::{HttpFetcher, ReferenceSourceAdapter, TableSourceAdapter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,fxsnap_app=debug,fxsnap_hex=debug,fxsnap_sources=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting snapshot server on port {}", config.port);
    tracing::info!(
        table = %config.table_url,
        reference = %config.reference_url,
        interval = ?config.refresh_interval,
        "Configured sources"
    );

    // Build source adapters sharing one connection pool
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let table = TableSourceAdapter::new(
        config.table_url.clone(),
        fetcher.clone(),
        config.table_settings(),
    )?;
    let reference = ReferenceSourceAdapter::new(
        config.reference_url.clone(),
        fetcher,
        config.reference_settings(),
    )?;

    // Start the refresh loop
    let store = Arc::new(SnapshotStore::new());
    let (scheduler, refresh) =
        RefreshScheduler::new(table, reference, store.clone(), config.scheduler_config());
    let refresh_task = scheduler.spawn();

    // Create and run the HTTP server
    let server = HttpServer::new(RateService::new(store, refresh));
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    refresh_task.abort();
    tracing::info!("Refresh scheduler stopped");
    result
}
