//! Handler for dry-run graph validation.

use axum::response::IntoResponse;
use axum::Json;
use voxflow_core::document::FlowDocument;
use voxflow_core::validation::validate;

use crate::error::AppResult;
use crate::middleware::RequireTenant;
use crate::response::DataResponse;
use crate::state::AppState;
use axum::extract::State;

/// POST /api/v1/flows/validate
///
/// Validate a graph document without persisting anything. Always responds
/// 200 with the full report; validation findings are data, not failures, so
/// an editor can render "N errors, M warnings" from one shape.
pub async fn validate_graph(
    RequireTenant(_ctx): RequireTenant,
    State(_state): State<AppState>,
    Json(doc): Json<FlowDocument>,
) -> AppResult<impl IntoResponse> {
    let report = validate(&doc);
    Ok(Json(DataResponse { data: report }))
}
