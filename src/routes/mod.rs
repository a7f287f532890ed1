// HTTP routes

mod http;

use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::collector::SnapshotCollector;
use crate::config::ServerConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) collector: Arc<SnapshotCollector>,
}

/// Builds the router: one stats endpoint behind the configured CORS policy.
pub fn app(collector: Arc<SnapshotCollector>, server: &ServerConfig) -> Router {
    let state = AppState { collector };
    Router::new()
        .route("/api/stats", get(http::stats_handler)) // GET /api/stats
        .layer(cors_layer(server))
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(origins)
}
