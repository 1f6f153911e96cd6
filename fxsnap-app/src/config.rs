//! Configuration loading from environment.

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use anyhow::{Context, bail};
use fxsnap_hex::SchedulerConfig;
use fxsnap_sources::{QuoteSide, ReferenceSettings, TableSettings};

/// Largest scale a decimal can carry.
const MAX_PRECISION: u32 = 28;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub table_url: String,
    pub reference_url: String,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub precision: u32,
    pub allow_list: Option<BTreeSet<String>>,
    pub known_currencies_only: bool,
    pub base_label: String,
    pub rate_column: usize,
    pub reference_currency: String,
    pub reference_denomination: String,
    pub reference_side: QuoteSide,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse::<u16>()
            .context("PORT must be a port number")?;

        let refresh_interval = positive_secs(&var("FXSNAP_REFRESH_INTERVAL_SECS", "60"))
            .context("FXSNAP_REFRESH_INTERVAL_SECS")?;
        let fetch_timeout = positive_secs(&var("FXSNAP_FETCH_TIMEOUT_SECS", "10"))
            .context("FXSNAP_FETCH_TIMEOUT_SECS")?;

        let precision: u32 = var("FXSNAP_PRECISION", "6")
            .parse()
            .context("FXSNAP_PRECISION must be a non-negative integer")?;
        if precision > MAX_PRECISION {
            bail!("FXSNAP_PRECISION must be at most {MAX_PRECISION}, got {precision}");
        }

        let allow_list = lookup("FXSNAP_ALLOW_LIST")
            .map(|raw| parse_allow_list(&raw))
            .transpose()
            .context("FXSNAP_ALLOW_LIST")?
            .filter(|codes| !codes.is_empty());

        let known_currencies_only = var("FXSNAP_KNOWN_CURRENCIES_ONLY", "false")
            .parse::<bool>()
            .context("FXSNAP_KNOWN_CURRENCIES_ONLY must be true or false")?;

        let rate_column = var("FXSNAP_RATE_COLUMN", "2")
            .parse::<usize>()
            .context("FXSNAP_RATE_COLUMN must be a cell index")?;
        if rate_column == 0 {
            bail!("FXSNAP_RATE_COLUMN must be at least 1, cell 0 holds the currency code");
        }

        let base_label = var("FXSNAP_BASE_LABEL", "SGD");
        if base_label.trim().is_empty() {
            bail!("FXSNAP_BASE_LABEL must not be empty");
        }

        let reference_currency = var("FXSNAP_REFERENCE_CURRENCY", "SGD");
        if !is_currency_code(&reference_currency) {
            bail!(
                "FXSNAP_REFERENCE_CURRENCY must be a three-letter uppercase code, got {reference_currency:?}"
            );
        }

        let reference_denomination = var("FXSNAP_REFERENCE_DENOMINATION", "100");
        if reference_denomination.is_empty()
            || reference_denomination.contains(char::is_whitespace)
        {
            bail!(
                "FXSNAP_REFERENCE_DENOMINATION must be a single token, got {reference_denomination:?}"
            );
        }

        let reference_side = var("FXSNAP_REFERENCE_SIDE", "buy")
            .parse::<QuoteSide>()
            .map_err(anyhow::Error::msg)
            .context("FXSNAP_REFERENCE_SIDE")?;

        Ok(Self {
            port,
            table_url: var("FXSNAP_TABLE_URL", "https://cashchanger.co/singapore"),
            reference_url: var("FXSNAP_REFERENCE_URL", "https://grandsuperrich.com"),
            refresh_interval,
            fetch_timeout,
            precision,
            allow_list,
            known_currencies_only,
            base_label,
            rate_column,
            reference_currency,
            reference_denomination,
            reference_side,
        })
    }

    pub fn table_settings(&self) -> TableSettings {
        TableSettings {
            rate_column: self.rate_column,
            base_label: self.base_label.clone(),
            known_currencies_only: self.known_currencies_only,
            allow_list: self.allow_list.clone(),
        }
    }

    pub fn reference_settings(&self) -> ReferenceSettings {
        ReferenceSettings {
            currency: self.reference_currency.clone(),
            denomination: self.reference_denomination.clone(),
            side: self.reference_side,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.refresh_interval,
            precision: self.precision,
        }
    }
}

fn positive_secs(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("expected whole seconds, got {raw:?}"))?;
    if secs == 0 {
        bail!("must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

fn parse_allow_list(raw: &str) -> anyhow::Result<BTreeSet<String>> {
    raw.split(',')
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty())
        .map(|code| {
            if is_currency_code(&code) {
                Ok(code)
            } else {
                bail!("{code:?} is not a three-letter currency code")
            }
        })
        .collect()
}
