//! Demo fixture: random-walk price data for exercising the dashboard
//! without storage access.
//!
//! Nothing here is a forecast. The "forecast" half is the same random walk
//! with a slight upward drift, and is only served by the `/mock` route.
//! The walk is seeded from the symbol and the day, so a symbol shows the
//! same demo data until midnight UTC.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MetricsConfig;
use crate::models::{PricePoint, StockData};
use crate::services::metrics_service::compute_metrics;

pub const MOCK_HISTORY_DAYS: i64 = 30;
pub const MOCK_FORECAST_DAYS: i64 = 30;

pub fn mock_stock_data(symbol: &str, metrics_config: &MetricsConfig) -> StockData {
    mock_stock_data_on(symbol, Utc::now().date_naive(), metrics_config)
}

pub fn mock_stock_data_on(symbol: &str, today: NaiveDate, metrics_config: &MetricsConfig) -> StockData {
    let mut rng = StdRng::seed_from_u64(mock_seed(symbol, today));
    generate_mock_stock_data(&mut rng, today, metrics_config)
}

// FNV-1a over the uppercased symbol, mixed with the day number.
fn mock_seed(symbol: &str, day: NaiveDate) -> u64 {
    let hash = symbol
        .bytes()
        .map(|b| b.to_ascii_uppercase())
        .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    hash ^ (day.num_days_from_ce() as u64)
}

/// Builds 30 daily points ending `today` and 30 forecast points after it.
pub fn generate_mock_stock_data<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
    metrics_config: &MetricsConfig,
) -> StockData {
    let base_price = 150.0 + rng.random::<f64>() * 200.0;
    let volatility = 0.02 + rng.random::<f64>() * 0.03;

    let historical: Vec<PricePoint> = (0..MOCK_HISTORY_DAYS)
        .rev()
        .map(|days_back| {
            let noise = (rng.random::<f64>() - 0.5) * volatility * base_price;
            PricePoint::new(
                format_day(today - Duration::days(days_back)),
                round_price((base_price + noise).max(1.0)),
                false,
            )
        })
        .collect();

    let mut current = historical.last().map(|p| p.price).unwrap_or(base_price);
    let forecast: Vec<PricePoint> = (1..=MOCK_FORECAST_DAYS)
        .map(|days_ahead| {
            let trend = (rng.random::<f64>() - 0.4) * volatility * current;
            current = (current + trend).max(1.0);
            PricePoint::new(
                format_day(today + Duration::days(days_ahead)),
                round_price(current),
                true,
            )
        })
        .collect();

    let metrics = compute_metrics(&historical, &forecast, metrics_config);

    StockData {
        historical,
        forecast,
        metrics,
    }
}

fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
