use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_SERVICE_NAME: &str = "forecast-dashboard";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub service_name: String,
    pub environment: String,
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `RUST_LOG`, `SERVICE_NAME`, `ENVIRONMENT`, `LOKI_ENABLED` and `LOKI_URL`.
    /// Anything unset or unreadable keeps its default; Loki stays off.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            service_name: var("SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            loki_enabled: var("LOKI_ENABLED")
                .and_then(|s| s.trim().to_ascii_lowercase().parse::<bool>().ok())
                .unwrap_or(false),
            loki_url: var("LOKI_URL"),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match (&self.loki_enabled, &self.loki_url) {
            (true, None) => Err("LOKI_ENABLED is set but LOKI_URL is missing".to_string()),
            _ => Ok(()),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if let (true, Some(loki_url)) = (config.loki_enabled, config.loki_url.as_deref()) {
            return init_with_loki(&config, loki_url);
        }
    }

    tracing_subscriber::registry()
        .with(config.filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "console logging ready"
    );
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: &LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (loki_layer, shipper) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url::Url::parse(loki_url)?)?;

    // Must run on the runtime for buffered events to reach Loki.
    tokio::spawn(shipper);

    tracing_subscriber::registry()
        .with(config.filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(loki_layer)
        .init();

    tracing::info!(service = %config.service_name, loki = loki_url, "loki logging ready");
    Ok(())
}
