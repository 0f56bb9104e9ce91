use axum::Router;
use http::header::{HeaderName, CONTENT_TYPE, AUTHORIZATION};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{functions, health, stocks};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/stocks", stocks::router())
        .nest("/functions/v1", functions::router())
        .layer(cors_layer())
        .with_state(state)
}

// Browsers call the API from the dashboard origin; pre-flight OPTIONS is
// answered by the layer with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
