//! Handlers for the `/flows` resource: flow CRUD, draft creation, and the
//! per-flow version list and audit trail.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use voxflow_core::document::FlowDocument;
use voxflow_core::error::CoreError;
use voxflow_core::types::DbId;
use voxflow_db::models::flow::{CreateFlow, UpdateFlow};
use voxflow_db::repositories::{AuditLogRepo, FlowRepo, FlowVersionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::RequireTenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// Pagination query parameters with service-wide caps.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

// ---------------------------------------------------------------------------
// Flow CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/flows
pub async fn create_flow(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Json(input): Json<CreateFlow>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "flow name must not be empty".to_string(),
        )));
    }

    let flow = FlowRepo::create(&state.pool, ctx.tenant_id, &input).await?;

    tracing::info!(
        flow_id = flow.id,
        tenant_id = ctx.tenant_id,
        name = %flow.name,
        "Flow created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: flow })))
}

/// GET /api/v1/flows
pub async fn list_flows(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let flows =
        FlowRepo::list_by_tenant(&state.pool, ctx.tenant_id, params.limit(), params.offset())
            .await?;
    Ok(Json(DataResponse { data: flows }))
}

/// GET /api/v1/flows/{id}
pub async fn get_flow(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let flow = FlowRepo::find_by_id(&state.pool, ctx.tenant_id, flow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flow",
            id: flow_id,
        }))?;
    Ok(Json(DataResponse { data: flow }))
}

/// PUT /api/v1/flows/{id}
pub async fn update_flow(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
    Json(input): Json<UpdateFlow>,
) -> AppResult<impl IntoResponse> {
    let flow = FlowRepo::update(&state.pool, ctx.tenant_id, flow_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flow",
            id: flow_id,
        }))?;

    tracing::info!(flow_id, tenant_id = ctx.tenant_id, "Flow updated");

    Ok(Json(DataResponse { data: flow }))
}

/// DELETE /api/v1/flows/{id}
///
/// Bot references to the flow are checked by the bot registry before this
/// endpoint is reached; here the delete cascades to versions and audit rows.
pub async fn delete_flow(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = FlowRepo::delete(&state.pool, ctx.tenant_id, flow_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Flow",
            id: flow_id,
        }));
    }

    tracing::info!(flow_id, tenant_id = ctx.tenant_id, "Flow deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Versions and audit trail
// ---------------------------------------------------------------------------

/// GET /api/v1/flows/{id}/versions
pub async fn list_versions(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    // Distinguish an empty version list from an unknown flow.
    FlowRepo::find_by_id(&state.pool, ctx.tenant_id, flow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flow",
            id: flow_id,
        }))?;

    let versions = FlowVersionRepo::list_by_flow(&state.pool, ctx.tenant_id, flow_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/flows/{id}/versions
///
/// Create the flow's next draft version from the supplied graph document.
/// Fails with 409 if the flow already has a draft.
pub async fn create_draft(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
    Json(doc): Json<FlowDocument>,
) -> AppResult<impl IntoResponse> {
    let version =
        FlowVersionRepo::create_draft(&state.pool, ctx.tenant_id, flow_id, &doc).await?;

    tracing::info!(
        flow_id,
        version_id = version.id,
        version_number = version.version_number,
        tenant_id = ctx.tenant_id,
        "Draft version created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/flows/{id}/audit
pub async fn get_audit(
    RequireTenant(ctx): RequireTenant,
    State(state): State<AppState>,
    Path(flow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    FlowRepo::find_by_id(&state.pool, ctx.tenant_id, flow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flow",
            id: flow_id,
        }))?;

    let trail = AuditLogRepo::list_by_flow(&state.pool, ctx.tenant_id, flow_id).await?;
    Ok(Json(DataResponse { data: trail }))
}
