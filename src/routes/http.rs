// GET handlers: api/stats

use axum::{Json, extract::State};
use std::time::Instant;

use super::AppState;
use crate::error::CollectError;
use crate::models::Snapshot;

/// GET /api/stats: collects a fresh snapshot; failures map to a JSON error body.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, CollectError> {
    let started = Instant::now();
    let snapshot = state.collector.collect().await?;
    tracing::info!(
        route = "/api/stats",
        elapsed_ms = started.elapsed().as_millis() as u64,
        "GET /api/stats 200"
    );
    Ok(Json(snapshot))
}
