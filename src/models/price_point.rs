use serde::{Deserialize, Serialize};

// One dated price taken from a single CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    #[serde(rename = "forecast", default)]
    pub is_forecast: bool,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64, is_forecast: bool) -> Self {
        Self {
            date: date.into(),
            price,
            is_forecast,
        }
    }
}

/// Points ordered ascending by their parsed date.
pub type PriceSeries = Vec<PricePoint>;

/// Which kind of blob a series was read from. Decides the price column
/// and the `forecast` flag on every parsed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Historical,
    Forecast,
}

impl SeriesKind {
    pub fn price_column(&self) -> &'static str {
        match self {
            SeriesKind::Historical => "c",
            SeriesKind::Forecast => "pred_price",
        }
    }

    pub fn is_forecast(&self) -> bool {
        matches!(self, SeriesKind::Forecast)
    }
}
