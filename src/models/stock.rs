use serde::{Deserialize, Serialize};

use super::{Metrics, PriceSeries};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    pub symbol: String,
    pub name: String,
}

// Body of the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockList {
    pub stocks: Vec<StockInfo>,
}

// Body of the fetch endpoint: both series plus the derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub historical: PriceSeries,
    pub forecast: PriceSeries,
    pub metrics: Metrics,
}
