mod price_point;
mod metrics;
mod stock;

pub use price_point::{PricePoint, PriceSeries, SeriesKind};
pub use metrics::Metrics;
pub use stock::{StockData, StockInfo, StockList};
