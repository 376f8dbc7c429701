//! Route definitions for the `/versions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::versions;
use crate::state::AppState;

/// Routes mounted at `/versions`.
///
/// ```text
/// GET  /{id}          -> get_version
/// PUT  /{id}          -> update_draft
/// POST /{id}/promote  -> promote
/// POST /{id}/archive  -> archive
/// ```
pub fn versions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(versions::get_version).put(versions::update_draft),
        )
        .route("/{id}/promote", post(versions::promote))
        .route("/{id}/archive", post(versions::archive))
}
