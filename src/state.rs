use std::sync::Arc;

use crate::config::MetricsConfig;
use crate::external::blob_store::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub blob_store: Arc<dyn BlobStore>,
    pub container: String,
    pub metrics_config: Arc<MetricsConfig>,
}
