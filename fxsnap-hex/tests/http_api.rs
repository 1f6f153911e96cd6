//! HTTP-level tests for the snapshot API.
//!
//! The router is driven with `oneshot`; sources are in-memory.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use fxsnap_hex::{RateService, RefreshScheduler, SchedulerConfig, SnapshotStore, inbound::HttpServer};
use fxsnap_types::{
    FetchError, RateEntry, Reference, ReferenceRate, ReferenceSource, SourceError, SourceTable,
    TableSource,
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use tower::ServiceExt;

struct FixedTable(Result<SourceTable, SourceError>);

#[async_trait]
impl TableSource for FixedTable {
    async fn load_table(&self) -> Result<SourceTable, SourceError> {
        self.0.clone()
    }
}

struct FixedReference;

#[async_trait]
impl ReferenceSource for FixedReference {
    async fn load_reference(&self) -> Reference {
        Reference::Quoted(ReferenceRate::new(
            RateEntry::new("SGD 100", dec!(25.10)).unwrap(),
        ))
    }
}

fn usd_and_jpy() -> Result<SourceTable, SourceError> {
    Ok([
        RateEntry::new("USD", dec!(1.30)).unwrap(),
        RateEntry::new("JPY", dec!(0.0091)).unwrap(),
    ]
    .into_iter()
    .collect())
}

fn build(
    table: Result<SourceTable, SourceError>,
) -> (RefreshScheduler<FixedTable, FixedReference>, HttpServer) {
    let store = Arc::new(SnapshotStore::new());
    let (scheduler, handle) = RefreshScheduler::new(
        FixedTable(table),
        FixedReference,
        store.clone(),
        SchedulerConfig::default(),
    );
    (scheduler, HttpServer::new(RateService::new(store, handle)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_scheduler, server) = build(usd_and_jpy());

    let response = server.router().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["refresh_state"], "idle");
    assert_eq!(json["cycle"], 0);
}

#[tokio::test]
async fn test_rates_before_first_cycle_are_null() {
    let (_scheduler, server) = build(usd_and_jpy());

    let response = server.router().oneshot(get("/api/rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["last_updated"].is_null());
    assert!(json["rates"].is_null());
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn test_rates_after_cycle() {
    let (mut scheduler, server) = build(usd_and_jpy());
    scheduler.run_cycle().await;

    let response = server.router().oneshot(get("/api/rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["cycle"], 1);
    assert!(json["last_updated"].is_string());
    assert!((json["rates"]["USD"].as_f64().unwrap() - 32.63).abs() < 1e-9);
    assert!((json["rates"]["JPY"].as_f64().unwrap() - 0.22841).abs() < 1e-9);
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn test_rates_after_table_failure() {
    let (mut scheduler, server) = build(Err(FetchError::HttpStatus {
        url: "https://cashchanger.test/singapore".into(),
        code: 503,
    }
    .into()));
    scheduler.run_cycle().await;

    let response = server.router().oneshot(get("/api/rates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["rates"].is_null());
    assert!(json["error"].as_str().unwrap().contains("HTTP 503"));
    assert!(json["last_updated"].is_string());
}

#[tokio::test]
async fn test_refresh_is_accepted() {
    let (_scheduler, server) = build(usd_and_jpy());

    let response = server.router().oneshot(post("/api/refresh")).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["status"], "accepted");
}

#[tokio::test]
async fn test_refresh_without_scheduler_is_unavailable() {
    let (scheduler, server) = build(usd_and_jpy());
    drop(scheduler);

    let response = server.router().oneshot(post("/api/refresh")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["code"], 503);
}

#[tokio::test]
async fn test_refresh_requires_post() {
    let (_scheduler, server) = build(usd_and_jpy());

    let response = server.router().oneshot(get("/api/refresh")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
