//! FxSnap CLI
//!
//! Queries a running snapshot server, or runs the scrapers locally.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use fxsnap_client::FxClient;
use fxsnap_hex::{RefreshScheduler, SchedulerConfig, SnapshotStore};
use fxsnap_sources::{
    HttpFetcher, QuoteSide, ReferenceSettings, ReferenceSourceAdapter, StaticFetcher,
    TableSettings, TableSourceAdapter,
};
use fxsnap_types::{Reference, ReferenceSource, SnapshotResponse, TableSource};

#[derive(Parser)]
#[command(name = "fxsnap")]
#[command(author, version, about = "Exchange-rate snapshot CLI", long_about = None)]
struct Cli {
    /// Base URL of the snapshot API
    #[arg(long, env = "FXSNAP_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Print the current snapshot
    Rates,
    /// Request a manual refresh
    Refresh,
    /// Fetch both sources and run one reconciliation cycle locally
    Scrape {
        /// Table source page
        #[arg(long, default_value = "https://cashchanger.co/singapore")]
        table_url: String,
        /// Reference source page
        #[arg(long, default_value = "https://grandsuperrich.com")]
        reference_url: String,
        /// Fetch timeout in seconds
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,
        /// Decimal places of derived rates
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=28))]
        precision: u32,
        #[command(flatten)]
        extraction: ExtractionArgs,
    },
    /// Run the extractor chain over a saved page
    Extract {
        /// HTML file to read
        #[arg(long)]
        file: PathBuf,
        /// Which source the page came from
        #[arg(long, value_enum, default_value_t = SourceKind::Table)]
        kind: SourceKind,
        #[command(flatten)]
        extraction: ExtractionArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Table,
    Reference,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Buy,
    Sell,
}

impl From<Side> for QuoteSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => QuoteSide::Buy,
            Side::Sell => QuoteSide::Sell,
        }
    }
}

#[derive(Args)]
struct ExtractionArgs {
    /// Codes to keep (comma-separated)
    #[arg(long, value_delimiter = ',')]
    allow_list: Vec<String>,
    /// Only accept well-known currency codes from table rows
    #[arg(long)]
    known_only: bool,
    /// Local-currency label in free-text quotes
    #[arg(long, default_value = "SGD")]
    base_label: String,
    /// Zero-based cell index of the rate in table rows
    #[arg(long, default_value_t = 2)]
    rate_column: usize,
    /// Reference currency code
    #[arg(long, default_value = "SGD")]
    reference_currency: String,
    /// Reference banknote denomination
    #[arg(long, default_value = "100")]
    reference_denomination: String,
    /// Reference quote side
    #[arg(long, value_enum, default_value_t = Side::Buy)]
    side: Side,
}

impl ExtractionArgs {
    fn table_settings(&self) -> TableSettings {
        let allow_list: BTreeSet<String> = self
            .allow_list
            .iter()
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();

        TableSettings {
            rate_column: self.rate_column,
            base_label: self.base_label.clone(),
            known_currencies_only: self.known_only,
            allow_list: (!allow_list.is_empty()).then_some(allow_list),
        }
    }

    fn reference_settings(&self) -> ReferenceSettings {
        ReferenceSettings {
            currency: self.reference_currency.clone(),
            denomination: self.reference_denomination.clone(),
            side: self.side.into(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }

        Commands::Rates => {
            let snapshot = client.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Refresh => {
            client.refresh().await?;
            println!("✓ Refresh queued");
        }

        Commands::Scrape {
            table_url,
            reference_url,
            timeout,
            precision,
            extraction,
        } => {
            let fetcher = HttpFetcher::new(Duration::from_secs(timeout))?;
            let table =
                TableSourceAdapter::new(table_url, fetcher.clone(), extraction.table_settings())?;
            let reference = ReferenceSourceAdapter::new(
                reference_url,
                fetcher,
                extraction.reference_settings(),
            )?;

            let store = Arc::new(SnapshotStore::new());
            let config = SchedulerConfig {
                precision,
                ..SchedulerConfig::default()
            };
            let (mut scheduler, _refresh) = RefreshScheduler::new(table, reference, store, config);
            let snapshot = scheduler.run_cycle().await;

            let response = SnapshotResponse::from(snapshot.as_ref());
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Extract {
            file,
            kind,
            extraction,
        } => {
            let markup = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let origin = file.display().to_string();
            let fetcher = StaticFetcher::page(markup);

            match kind {
                SourceKind::Table => {
                    let source =
                        TableSourceAdapter::new(origin, fetcher, extraction.table_settings())?;
                    let table = source.load_table().await?;
                    println!("{}", serde_json::to_string_pretty(&table)?);
                }
                SourceKind::Reference => {
                    let source = ReferenceSourceAdapter::new(
                        origin,
                        fetcher,
                        extraction.reference_settings(),
                    )?;
                    match source.load_reference().await {
                        Reference::Quoted(rate) => {
                            println!("{}", serde_json::to_string_pretty(&rate)?);
                        }
                        Reference::Missing(degraded) => anyhow::bail!(degraded),
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_args() {
        let cli = Cli::try_parse_from([
            "fxsnap",
            "extract",
            "--file",
            "page.html",
            "--kind",
            "reference",
            "--side",
            "sell",
            "--allow-list",
            "usd,jpy",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract {
                kind, extraction, ..
            } => {
                assert!(matches!(kind, SourceKind::Reference));
                assert_eq!(extraction.reference_settings().side, QuoteSide::Sell);
                let allowed = extraction.table_settings().allow_list.unwrap();
                assert!(allowed.contains("USD") && allowed.contains("JPY"));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_scrape_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["fxsnap", "scrape", "--timeout", "0"]).is_err());
    }
}
