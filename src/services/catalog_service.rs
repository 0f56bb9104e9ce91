use std::collections::BTreeSet;

use tracing::{error, info};

use crate::errors::AppError;
use crate::external::blob_store::BlobStore;
use crate::models::StockInfo;

// Display names for the symbols we publish forecasts for.
const KNOWN_STOCKS: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc"),
    ("AMZN", "Amazon.com Inc"),
    ("BTCUSD", "Bitcoin USD cryptocurrency"),
    ("CHWY", "Chewy Inc"),
    ("GME", "GameStop Corp"),
    ("GOOGL", "Alphabet Inc"),
    ("META", "Meta Platforms Inc"),
    ("MSFT", "Microsoft Corporation"),
    ("NVDA", "NVIDIA Corporation"),
    ("QQQ", "Invesco QQQ Trust, Series 1"),
    ("SMCI", "Super Micro Computer Inc"),
    ("SPY", "SPDR S&P 500 ETF Trust"),
    ("TSLA", "Tesla Inc"),
];

/// Display name for a symbol, `"<SYMBOL> Stock"` when it is not a known one.
pub fn stock_name(symbol: &str) -> String {
    KNOWN_STOCKS
        .iter()
        .find(|(known, _)| *known == symbol)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("{} Stock", symbol))
}

/// One entry per distinct top-level folder, uppercased and sorted.
pub fn list_symbols<I, S>(blob_paths: I) -> Vec<StockInfo>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let symbols: BTreeSet<String> = blob_paths
        .into_iter()
        .filter_map(|path| {
            let first = path.as_ref().split('/').next()?.trim();
            (!first.is_empty()).then(|| first.to_uppercase())
        })
        .collect();

    symbols
        .into_iter()
        .map(|symbol| StockInfo {
            name: stock_name(&symbol),
            symbol,
        })
        .collect()
}

pub async fn list_available_stocks(
    store: &dyn BlobStore,
    container: &str,
) -> Result<Vec<StockInfo>, AppError> {
    info!("Listing available stocks in container {}", container);

    let names = store.list_blob_names(container).await.map_err(|e| {
        error!("Failed to list blobs in {}: {}", container, e);
        AppError::stock_list(e)
    })?;

    let stocks = list_symbols(&names);
    info!("Found {} available stocks across {} blobs", stocks.len(), names.len());
    Ok(stocks)
}
