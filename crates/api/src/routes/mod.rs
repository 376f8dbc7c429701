//! Route definitions.

pub mod flows;
pub mod health;
pub mod versions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /flows                       list, create
/// /flows/validate              dry-run graph validation (POST)
/// /flows/{id}                  get, update, delete
/// /flows/{id}/versions         list versions, create draft (GET, POST)
/// /flows/{id}/audit            lifecycle audit trail (GET)
///
/// /versions/{id}               get, update draft (GET, PUT)
/// /versions/{id}/promote       promote to staged or live (POST)
/// /versions/{id}/archive       archive draft/staged version (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/flows", flows::flows_router())
        .nest("/versions", versions::versions_router())
}
