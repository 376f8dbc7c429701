//! Health check route, mounted at the root (not under `/api/v1`).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Liveness plus a database round-trip.
async fn health(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    voxflow_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
