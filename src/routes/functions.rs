// Routes named after the serverless functions the dashboard frontend calls.

use axum::extract::{Query, State};
use axum::{Json, Router};
use axum::routing::get;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::StockData;
use crate::routes::stocks;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FetchStockQuery {
    pub symbol: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list-stocks", get(stocks::list_stocks))
        .route("/fetch-stock-data", get(fetch_stock_data))
}

async fn fetch_stock_data(
    Query(query): Query<FetchStockQuery>,
    State(state): State<AppState>
) -> Result<Json<StockData>, AppError> {
    let symbol = services::stock_data_service::normalize_symbol(query.symbol.as_deref())?;
    info!("GET /fetch-stock-data - Fetching data for symbol: {}", symbol);
    let data = services::stock_data_service::fetch_and_build(
        state.blob_store.as_ref(),
        &state.container,
        &state.metrics_config,
        &symbol,
    ).await?;
    Ok(Json(data))
}
