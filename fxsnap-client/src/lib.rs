//! # FxSnap Client SDK
//!
//! A typed Rust client for the snapshot API.

use fxsnap_types::{HealthResponse, RefreshResponse, SnapshotResponse};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Why a call to the snapshot server did not yield a response value.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server could not be reached or the body could not be read.
    #[error("Snapshot server request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status. `message` is the `error` field of the body when present.
    #[error("Snapshot server answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body the server sends with every non-2xx status.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Snapshot API client.
pub struct FxClient {
    base_url: String,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Server status, refresh state and the cycle being served.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health").await
    }

    /// The most recently published snapshot.
    pub async fn snapshot(&self) -> Result<SnapshotResponse, ClientError> {
        self.get("/api/rates").await
    }

    /// Requests an extra refresh cycle. Returns once it is queued.
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/refresh", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => body,
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
