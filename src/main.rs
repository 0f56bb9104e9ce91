use std::sync::Arc;

use tokio::net::TcpListener;

use forecast_dashboard::app;
use forecast_dashboard::config::{AppConfig, StorageBackend};
use forecast_dashboard::external::azure_blob::AzureBlobStore;
use forecast_dashboard::external::blob_store::BlobStore;
use forecast_dashboard::external::local_blob::LocalBlobStore;
use forecast_dashboard::logging::{init_logging, LoggingConfig};
use forecast_dashboard::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env();

    let blob_store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::Azure => {
            tracing::info!("Using Azure blob storage, container '{}'", config.storage.container);
            Arc::new(AzureBlobStore::from_config(&config.storage))
        }
        StorageBackend::Local => {
            tracing::info!(
                "Using local blob storage at {}, container '{}'",
                config.storage.local_root.display(),
                config.storage.container
            );
            Arc::new(LocalBlobStore::new(config.storage.local_root.clone()))
        }
    };

    tracing::info!(
        "Day change measured {} row(s) back",
        config.metrics.day_change_offset
    );

    let state = AppState {
        blob_store,
        container: config.storage.container.clone(),
        metrics_config: Arc::new(config.metrics.clone()),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.server_addr).await?;
    tracing::info!("Forecast dashboard backend running at http://{}/", config.server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
