//! Handlers for the `/versions` resource: draft editing, promotion, and
//! archival.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use voxflow_core::document::FlowDocument;
use voxflow_core::error::CoreError;
use voxflow_core::lifecycle::PromoteTarget;
use voxflow_core::types::DbId;
use voxflow_db::repositories::FlowVersionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::RequireTenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/versions/{id}
pub async fn get_version(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = FlowVersionRepo::find_by_id(&state.pool, ctx.tenant_id, version_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FlowVersion",
            id: version_id,
        }))?;
    Ok(Json(DataResponse { data: version }))
}

/// PUT /api/v1/versions/{id}
///
/// Replace a draft's graph document. Fails with 422 when the version has
/// left `draft`; staged, live, and archived payloads are immutable.
pub async fn update_draft(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
    Json(doc): Json<FlowDocument>,
) -> AppResult<impl IntoResponse> {
    let version =
        FlowVersionRepo::update_draft(&state.pool, ctx.tenant_id, version_id, &doc).await?;

    tracing::info!(
        version_id,
        flow_id = version.flow_id,
        tenant_id = ctx.tenant_id,
        "Draft version updated",
    );

    Ok(Json(DataResponse { data: version }))
}

/// Request body for a promotion.
#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub target: PromoteTarget,
}

/// POST /api/v1/versions/{id}/promote
///
/// Promote the version to `staged` or `live`. The stored graph must pass
/// validation. Promoting to `live` archives the flow's previous live
/// version in the same transaction; a lost race surfaces as 409.
pub async fn promote(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
    Json(input): Json<PromoteRequest>,
) -> AppResult<impl IntoResponse> {
    let version = FlowVersionRepo::promote(
        &state.pool,
        ctx.tenant_id,
        version_id,
        input.target,
        ctx.actor_id,
    )
    .await?;

    tracing::info!(
        version_id,
        flow_id = version.flow_id,
        version_number = version.version_number,
        target = %input.target,
        actor_id = ctx.actor_id,
        tenant_id = ctx.tenant_id,
        "Version promoted",
    );

    Ok(Json(DataResponse { data: version }))
}

/// POST /api/v1/versions/{id}/archive
///
/// Archive a draft or staged version. Live versions are refused with 422;
/// they leave `live` only by being superseded.
pub async fn archive(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let version =
        FlowVersionRepo::archive(&state.pool, ctx.tenant_id, version_id, ctx.actor_id).await?;

    tracing::info!(
        version_id,
        flow_id = version.flow_id,
        actor_id = ctx.actor_id,
        tenant_id = ctx.tenant_id,
        "Version archived",
    );

    Ok(Json(DataResponse { data: version }))
}
