use tracing::{error, info};

use crate::config::MetricsConfig;
use crate::errors::AppError;
use crate::external::blob_store::BlobStore;
use crate::models::{SeriesKind, StockData};
use crate::services::metrics_service::compute_metrics;
use crate::services::price_csv_parser::parse_price_csv;

pub const DEFAULT_SYMBOL: &str = "BTCUSD";

/// Uppercases a requested symbol after checking it is safe to use in a
/// blob path. Blank input selects [`DEFAULT_SYMBOL`].
pub fn normalize_symbol(raw: Option<&str>) -> Result<String, AppError> {
    let symbol = raw.map(str::trim).unwrap_or_default();
    if symbol.is_empty() {
        return Ok(DEFAULT_SYMBOL.to_string());
    }

    let allowed = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !allowed || symbol.contains("..") {
        return Err(AppError::Validation(format!("invalid symbol '{}'", symbol)));
    }

    Ok(symbol.to_uppercase())
}

/// Storage paths of the historical and forecast CSVs for a symbol.
pub fn blob_paths(symbol: &str) -> (String, String) {
    let key = symbol.to_lowercase();
    (
        format!("{key}/hour/1/data/{key}_historical.csv"),
        format!("{key}/hour/1/forecast/{key}_forecast.csv"),
    )
}

/// Fetches both CSVs concurrently, parses them and derives the metrics.
///
/// Either fetch failing fails the whole call; there is no partial result
/// and no retry. Parsing never fails.
pub async fn fetch_and_build(
    store: &dyn BlobStore,
    container: &str,
    metrics_config: &MetricsConfig,
    symbol: &str,
) -> Result<StockData, AppError> {
    let (historical_path, forecast_path) = blob_paths(symbol);
    info!("Fetching historical data for {} from {}/{}", symbol, container, historical_path);
    info!("Fetching forecast data for {} from {}/{}", symbol, container, forecast_path);

    let (historical_csv, forecast_csv) = tokio::try_join!(
        store.fetch_text(container, &historical_path),
        store.fetch_text(container, &forecast_path),
    )
    .map_err(|e| {
        error!("Failed to fetch CSV data for {}: {}", symbol, e);
        AppError::stock_data(e)
    })?;

    let historical = parse_price_csv(&historical_csv, SeriesKind::Historical);
    let forecast = parse_price_csv(&forecast_csv, SeriesKind::Forecast);
    info!(
        "Parsed {} historical points and {} forecast points for {}",
        historical.len(),
        forecast.len(),
        symbol
    );

    let metrics = compute_metrics(&historical, &forecast, metrics_config);

    Ok(StockData {
        historical,
        forecast,
        metrics,
    })
}
