//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use fxsnap_types::{AppError, RefreshResponse};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState {
    pub service: RateService,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.health())
}

/// Most recent snapshot. Never waits on a refresh in progress.
pub async fn get_rates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.snapshot())
}

/// Queue a manual refresh.
#[tracing::instrument(skip(state))]
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.service.request_refresh()?;
    tracing::info!("manual refresh queued");
    Ok((
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            status: "accepted".to_string(),
        }),
    ))
}
