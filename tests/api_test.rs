//! HTTP-level tests for the stock endpoints.
//!
//! The router is driven in-process with `oneshot` against an in-memory
//! blob store, so no storage account or network is needed.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use forecast_dashboard::app::create_app;
use forecast_dashboard::config::{MetricsConfig, StorageBackend, StorageConfig};
use forecast_dashboard::external::azure_blob::AzureBlobStore;
use forecast_dashboard::external::blob_store::BlobStore;
use forecast_dashboard::external::memory_blob::MemoryBlobStore;
use forecast_dashboard::state::AppState;

const CONTAINER: &str = "symbols";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_with(store: Arc<dyn BlobStore>) -> Router {
    create_app(AppState {
        blob_store: store,
        container: CONTAINER.to_string(),
        metrics_config: Arc::new(MetricsConfig::default()),
    })
}

fn seeded_store() -> MemoryBlobStore {
    let store = MemoryBlobStore::new();
    store.insert(
        CONTAINER,
        "aapl/hour/1/data/aapl_historical.csv",
        "ds,c\n2024-01-01,100\n2024-01-02,102",
    );
    store.insert(
        CONTAINER,
        "aapl/hour/1/forecast/aapl_forecast.csv",
        "ds,pred_price\n2024-01-03,105",
    );
    store.insert(
        CONTAINER,
        "btcusd/hour/1/data/btcusd_historical.csv",
        "ds,o,c\n2024-05-01 01:00:00,1,60100.5\n2024-05-01 00:00:00,1,60000\n",
    );
    store.insert(
        CONTAINER,
        "btcusd/hour/1/forecast/btcusd_forecast.csv",
        "ds,pred_price\n2024-05-01 02:00:00,60500\n",
    );
    store.insert(CONTAINER, "MSFT/hour/1/data/msft_historical.csv", "ds,c\n");
    store
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

// ---------------------------------------------------------------------------
// Stock data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_stock_data_end_to_end() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/api/stocks/aapl").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["historical"].as_array().unwrap().len(), 2);
    assert_eq!(body["historical"][0]["date"], "2024-01-01");
    assert_eq!(body["historical"][1]["price"], 102.0);
    assert_eq!(body["historical"][1]["forecast"], false);
    assert_eq!(body["forecast"][0]["price"], 105.0);
    assert_eq!(body["forecast"][0]["forecast"], true);

    let metrics = &body["metrics"];
    assert_eq!(metrics["currentPrice"], 102.0);
    assert_eq!(metrics["forecastPrice"], 105.0);
    assert_eq!(metrics["dayChange"], 2.0);
    assert_eq!(metrics["confidence"], 83);
    assert_eq!(metrics["volume"], "1.2M");
    assert_eq!(metrics["marketCap"], "850.2B");
    assert_eq!(metrics["peRatio"], 28.5);
}

#[tokio::test]
async fn test_function_route_defaults_to_btcusd() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/functions/v1/fetch-stock-data").await;

    assert_eq!(status, StatusCode::OK);
    // Rows were out of order in the blob.
    assert_eq!(body["historical"][0]["price"], 60000.0);
    assert_eq!(body["metrics"]["currentPrice"], 60100.5);
    assert_eq!(body["metrics"]["forecastPrice"], 60500.0);
}

#[tokio::test]
async fn test_function_route_accepts_symbol_query() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/functions/v1/fetch-stock-data?symbol=AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["currentPrice"], 102.0);
}

#[tokio::test]
async fn test_missing_blob_returns_500_with_details() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/api/stocks/tsla").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("tsla"));
    assert_eq!(body["details"], "Failed to fetch stock data from blob storage");
    assert!(body.get("historical").is_none());
}

#[tokio::test]
async fn test_invalid_symbol_is_rejected() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/functions/v1/fetch-stock-data?symbol=a%2F..%2Fb").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "Invalid stock symbol");
    assert!(body["error"].as_str().unwrap().contains("a/../b"));
}

#[tokio::test]
async fn test_mock_route_serves_fixture_data() {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let (status, body) = get(app, "/api/stocks/aapl/mock").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["historical"].as_array().unwrap().len(), 30);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 30);
    let confidence = body["metrics"]["confidence"].as_u64().unwrap();
    assert!((60..=95).contains(&confidence));
}

#[tokio::test]
async fn test_mock_route_is_stable_per_symbol() {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let (_, first) = get(app.clone(), "/api/stocks/aapl/mock").await;
    let (_, second) = get(app.clone(), "/api/stocks/AAPL/mock").await;
    let (_, other) = get(app, "/api/stocks/msft/mock").await;

    // Same UTC day unless the test straddles midnight.
    if first["historical"][29]["date"] == second["historical"][29]["date"] {
        assert_eq!(first, second);
    }
    assert_ne!(first["historical"], other["historical"]);
}

// ---------------------------------------------------------------------------
// Stock listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_stocks() {
    let app = app_with(Arc::new(seeded_store()));

    let (status, body) = get(app, "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    let stocks = body["stocks"].as_array().unwrap();
    let symbols: Vec<&str> = stocks.iter().map(|s| s["symbol"].as_str().unwrap()).collect();
    assert_eq!(symbols, vec!["AAPL", "BTCUSD", "MSFT"]);
    assert_eq!(stocks[1]["name"], "Bitcoin USD cryptocurrency");
}

#[tokio::test]
async fn test_list_function_route_matches() {
    let store: Arc<dyn BlobStore> = Arc::new(seeded_store());

    let (_, via_api) = get(app_with(store.clone()), "/api/stocks").await;
    let (status, via_function) = get(app_with(store), "/functions/v1/list-stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(via_api, via_function);
}

#[tokio::test]
async fn test_unconfigured_storage_returns_500() {
    let config = StorageConfig {
        backend: StorageBackend::Azure,
        account: None,
        connection_string: None,
        account_key: None,
        sas_token: None,
        endpoint: None,
        container: CONTAINER.to_string(),
        local_root: "./data".into(),
    };
    let app = app_with(Arc::new(AzureBlobStore::from_config(&config)));

    let (status, body) = get(app.clone(), "/api/stocks").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "Failed to list stocks from blob storage");
    assert!(body["error"].as_str().unwrap().contains("not configured"));

    let (status, body) = get(app, "/api/stocks/aapl").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "Failed to fetch stock data from blob storage");
}

// ---------------------------------------------------------------------------
// CORS and health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_preflight_is_answered_with_permissive_headers() {
    let app = app_with(Arc::new(seeded_store()));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/functions/v1/fetch-stock-data")
        .header(header::ORIGIN, "https://dashboard.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,apikey")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(allowed.contains("apikey"));
    assert!(allowed.contains("x-client-info"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_error_responses_carry_cors_header() {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let request = Request::builder()
        .uri("/api/stocks/aapl")
        .header(header::ORIGIN, "https://dashboard.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_health() {
    let app = app_with(Arc::new(MemoryBlobStore::new()));

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["container"], CONTAINER);
}
