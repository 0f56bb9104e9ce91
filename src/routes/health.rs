use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub container: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

// Liveness only; storage is not contacted.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    debug!("GET /health");
    Json(HealthStatus {
        status: "ok",
        container: state.container.clone(),
    })
}
