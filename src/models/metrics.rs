use serde::{Deserialize, Serialize};

/// Summary card values shown next to the chart.
///
/// `volume`, `market_cap` and `pe_ratio` are not derived from the series;
/// they come from [`crate::config::MetricsConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub current_price: f64,
    pub forecast_price: f64,
    pub confidence: u32,
    pub volume: String,
    pub market_cap: String,
    pub pe_ratio: f64,
    pub day_change: f64,
}
