//! HTTP markup fetcher backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use fxsnap_types::{FetchError, MarkupFetcher};
use reqwest::Client;
use tracing::{debug, instrument};

/// Browser-like identity; some sources reject default client agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/124.0.0.0 Safari/537.36";

/// Fetches a page with a single GET; no retries.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests are abandoned after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_user_agent(timeout, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

fn unreachable(url: &str, err: reqwest::Error) -> FetchError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    FetchError::Unreachable {
        url: url.to_string(),
        reason,
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unreachable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| unreachable(url, e))?;
        debug!(bytes = body.len(), "fetched markup");
        Ok(body)
    }
}

/// Serves one fixed outcome for every URL.
///
/// Used to replay saved pages through the source adapters.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    outcome: Result<String, FetchError>,
}

impl StaticFetcher {
    pub fn page(markup: impl Into<String>) -> Self {
        Self {
            outcome: Ok(markup.into()),
        }
    }

    pub fn failing(err: FetchError) -> Self {
        Self { outcome: Err(err) }
    }
}

#[async_trait]
impl MarkupFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        self.outcome.clone()
    }
}
