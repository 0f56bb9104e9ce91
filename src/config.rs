use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

pub const DEFAULT_CONTAINER: &str = "symbols";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

/// Top-level settings, read once at startup and handed to the app state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_addr: SocketAddr,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR")
            .and_then(|s| match s.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!("Ignoring invalid SERVER_ADDR '{}': {}", s, e);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        Self {
            server_addr,
            storage: StorageConfig::from_lookup(&lookup),
            metrics: MetricsConfig::from_lookup(&lookup),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Azure,
    Local,
}

/// Where blobs live and how to reach them.
///
/// None of the credentials are checked here. A missing account surfaces as
/// a configuration error on the first fetch, not at startup.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// `AZURE_STORAGE_ACCOUNT`, required for Azure unless the connection string names it.
    pub account: Option<String>,
    /// `AZURE_STORAGE_CONNECTION_STRING`, optional.
    pub connection_string: Option<String>,
    /// `AZURE_STORAGE_KEY`, read only to warn that it cannot be used.
    pub account_key: Option<String>,
    /// `AZURE_STORAGE_SAS_TOKEN`, optional. Anonymous reads when absent.
    pub sas_token: Option<String>,
    /// `AZURE_BLOB_ENDPOINT`, optional override of `https://{account}.blob.core.windows.net`.
    pub endpoint: Option<String>,
    /// `AZURE_CONTAINER_NAME`, defaults to `symbols`.
    pub container: String,
    /// `LOCAL_STORAGE_ROOT`, only read by the local backend.
    pub local_root: PathBuf,
}

impl StorageConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match non_empty("STORAGE_BACKEND")
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("local") => StorageBackend::Local,
            Some("azure") | None => StorageBackend::Azure,
            Some(other) => {
                warn!("Unknown STORAGE_BACKEND '{}', falling back to azure", other);
                StorageBackend::Azure
            }
        };

        Self {
            backend,
            account: non_empty("AZURE_STORAGE_ACCOUNT"),
            connection_string: non_empty("AZURE_STORAGE_CONNECTION_STRING"),
            account_key: non_empty("AZURE_STORAGE_KEY"),
            sas_token: non_empty("AZURE_STORAGE_SAS_TOKEN"),
            endpoint: non_empty("AZURE_BLOB_ENDPOINT"),
            container: non_empty("AZURE_CONTAINER_NAME")
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
            local_root: non_empty("LOCAL_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
        }
    }
}

/// Inputs to the metrics card that are not computed from the series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// How many rows before the last historical point the day change is
    /// measured against. `1` compares with the previous row; hourly data
    /// that should compare with the same hour yesterday uses `24`.
    pub day_change_offset: usize,
    pub volume: String,
    pub market_cap: String,
    pub pe_ratio: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            day_change_offset: 1,
            volume: "1.2M".to_string(),
            market_cap: "850.2B".to_string(),
            pe_ratio: 28.5,
        }
    }
}

impl MetricsConfig {
    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            day_change_offset: lookup("DAY_CHANGE_OFFSET")
                .and_then(|s| match s.trim().parse::<usize>() {
                    Ok(0) => {
                        warn!("Ignoring DAY_CHANGE_OFFSET=0, the change would always be 0");
                        None
                    }
                    Ok(offset) => Some(offset),
                    Err(e) => {
                        warn!("Ignoring invalid DAY_CHANGE_OFFSET '{}': {}", s, e);
                        None
                    }
                })
                .unwrap_or(defaults.day_change_offset),
            volume: lookup("METRICS_VOLUME").unwrap_or(defaults.volume),
            market_cap: lookup("METRICS_MARKET_CAP").unwrap_or(defaults.market_cap),
            pe_ratio: lookup("METRICS_PE_RATIO")
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(defaults.pe_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.server_addr.to_string(), DEFAULT_SERVER_ADDR);
        assert_eq!(config.storage.backend, StorageBackend::Azure);
        assert_eq!(config.storage.container, "symbols");
        assert!(config.storage.account.is_none());
        assert!(config.storage.connection_string.is_none());
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn test_reads_storage_settings() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AZURE_STORAGE_ACCOUNT", "acct"),
            ("AZURE_CONTAINER_NAME", "prices"),
            ("AZURE_STORAGE_SAS_TOKEN", "sv=1&sig=abc"),
            ("AZURE_STORAGE_KEY", "c2VjcmV0"),
            ("STORAGE_BACKEND", "LOCAL"),
            ("LOCAL_STORAGE_ROOT", "/srv/blobs"),
        ]));

        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.account.as_deref(), Some("acct"));
        assert_eq!(config.storage.container, "prices");
        assert_eq!(config.storage.sas_token.as_deref(), Some("sv=1&sig=abc"));
        assert_eq!(config.storage.account_key.as_deref(), Some("c2VjcmV0"));
        assert_eq!(config.storage.local_root, PathBuf::from("/srv/blobs"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("AZURE_STORAGE_ACCOUNT", "  "),
            ("AZURE_CONTAINER_NAME", ""),
        ]));

        assert!(config.storage.account.is_none());
        assert_eq!(config.storage.container, "symbols");
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DAY_CHANGE_OFFSET", "yesterday"),
            ("METRICS_PE_RATIO", "NaN"),
            ("SERVER_ADDR", "not-an-addr"),
        ]));

        assert_eq!(config.metrics.day_change_offset, 1);
        assert_eq!(config.metrics.pe_ratio, 28.5);
        assert_eq!(config.server_addr.to_string(), DEFAULT_SERVER_ADDR);
    }

    #[test]
    fn test_metrics_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DAY_CHANGE_OFFSET", "24"),
            ("METRICS_VOLUME", "3.4M"),
            ("METRICS_MARKET_CAP", "1.1T"),
            ("METRICS_PE_RATIO", "31.2"),
        ]));

        assert_eq!(config.metrics.day_change_offset, 24);
        assert_eq!(config.metrics.volume, "3.4M");
        assert_eq!(config.metrics.market_cap, "1.1T");
        assert_eq!(config.metrics.pe_ratio, 31.2);
    }

    #[test]
    fn test_zero_day_change_offset_is_rejected() {
        let config = AppConfig::from_lookup(lookup_from(&[("DAY_CHANGE_OFFSET", " 0 ")]));

        assert_eq!(config.metrics.day_change_offset, 1);
    }
}
