//! Request-independent pipeline pieces: parsing, metrics, catalog and
//! the fetch-and-build orchestration that ties them to a blob store.

pub mod price_csv_parser;
pub mod metrics_service;
pub mod catalog_service;
pub mod stock_data_service;
pub mod mock_data_service;
