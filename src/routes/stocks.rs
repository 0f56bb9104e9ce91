use axum::extract::{Path, State};
use axum::{Json, Router};
use axum::routing::get;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{StockData, StockList};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/:symbol", get(get_stock_data))
        .route("/:symbol/mock", get(get_mock_stock_data))
}

pub async fn list_stocks(
    State(state): State<AppState>
) -> Result<Json<StockList>, AppError> {
    info!("GET /stocks - Listing available stocks");
    let stocks = services::catalog_service::list_available_stocks(
        state.blob_store.as_ref(),
        &state.container,
    ).await?;
    Ok(Json(StockList { stocks }))
}

pub async fn get_stock_data(
    Path(symbol): Path<String>,
    State(state): State<AppState>
) -> Result<Json<StockData>, AppError> {
    info!("GET /stocks/{} - Fetching stock data", symbol);
    let symbol = services::stock_data_service::normalize_symbol(Some(&symbol))?;
    let data = services::stock_data_service::fetch_and_build(
        state.blob_store.as_ref(),
        &state.container,
        &state.metrics_config,
        &symbol,
    ).await
        .map_err(|e| {
            error!("Failed to build stock data for {}: {}", symbol, e);
            e
        })?;
    Ok(Json(data))
}

pub async fn get_mock_stock_data(
    Path(symbol): Path<String>,
    State(state): State<AppState>
) -> Result<Json<StockData>, AppError> {
    let symbol = services::stock_data_service::normalize_symbol(Some(&symbol))?;
    info!("GET /stocks/{}/mock - Generating mock stock data", symbol);
    Ok(Json(services::mock_data_service::mock_stock_data(&symbol, &state.metrics_config)))
}
