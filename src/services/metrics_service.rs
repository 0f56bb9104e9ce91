use crate::config::MetricsConfig;
use crate::models::{Metrics, PricePoint};

pub const CONFIDENCE_BASE: f64 = 85.0;
pub const CONFIDENCE_MIN: f64 = 60.0;
pub const CONFIDENCE_MAX: f64 = 95.0;

/// Derives the metrics card from the two series.
///
/// Pure and deterministic. Empty series read as a price of 0, and every
/// division is guarded so the result is always finite:
/// - current price 0 gives the minimum confidence (60)
/// - a reference price of 0 gives a day change of 0
pub fn compute_metrics(
    historical: &[PricePoint],
    forecast: &[PricePoint],
    config: &MetricsConfig,
) -> Metrics {
    let current_price = historical.last().map(|p| p.price).unwrap_or(0.0);
    let forecast_price = forecast.last().map(|p| p.price).unwrap_or(0.0);
    let previous_price = previous_price(historical, config.day_change_offset)
        .unwrap_or(current_price);

    Metrics {
        current_price,
        forecast_price,
        confidence: confidence(historical, current_price),
        volume: config.volume.clone(),
        market_cap: config.market_cap.clone(),
        pe_ratio: config.pe_ratio,
        day_change: day_change(current_price, previous_price),
    }
}

/// Price `offset` rows before the last point, if the series is long enough.
fn previous_price(historical: &[PricePoint], offset: usize) -> Option<f64> {
    offset
        .checked_add(1)
        .and_then(|back| historical.len().checked_sub(back))
        .and_then(|idx| historical.get(idx))
        .map(|p| p.price)
}

fn day_change(current_price: f64, previous_price: f64) -> f64 {
    if previous_price == 0.0 {
        return 0.0;
    }
    round_to_cents((current_price - previous_price) / previous_price * 100.0)
}

/// Volatility heuristic: the wider the historical range relative to the
/// current price, the lower the score.
fn confidence(historical: &[PricePoint], current_price: f64) -> u32 {
    if current_price == 0.0 {
        return CONFIDENCE_MIN as u32;
    }

    let (min, max) = historical
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });
    let price_range = if historical.is_empty() { 0.0 } else { max - min };

    let raw = CONFIDENCE_BASE - (price_range / current_price) * 100.0;
    raw.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX).round() as u32
}

// Halves round toward +inf, so -3.125 becomes -3.12.
fn round_to_cents(value: f64) -> f64 {
    let rounded = (value * 100.0 + 0.5).floor() / 100.0;
    // avoid serializing -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}
