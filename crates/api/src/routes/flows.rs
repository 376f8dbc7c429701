//! Route definitions for the `/flows` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{flows, validation};
use crate::state::AppState;

/// Routes mounted at `/flows`.
///
/// ```text
/// GET    /               -> list_flows    (?limit, ?offset)
/// POST   /               -> create_flow
/// POST   /validate       -> validate_graph (dry-run, no persistence)
/// GET    /{id}           -> get_flow
/// PUT    /{id}           -> update_flow
/// DELETE /{id}           -> delete_flow
/// GET    /{id}/versions  -> list_versions
/// POST   /{id}/versions  -> create_draft
/// GET    /{id}/audit     -> get_audit
/// ```
pub fn flows_router() -> Router<AppState> {
    Router::new()
        .route("/", get(flows::list_flows).post(flows::create_flow))
        .route("/validate", post(validation::validate_graph))
        .route(
            "/{id}",
            get(flows::get_flow)
                .put(flows::update_flow)
                .delete(flows::delete_flow),
        )
        .route(
            "/{id}/versions",
            get(flows::list_versions).post(flows::create_draft),
        )
        .route("/{id}/audit", get(flows::get_audit))
}
