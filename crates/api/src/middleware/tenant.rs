//! Tenant-context extractor for Axum handlers.
//!
//! Authentication itself lives in the upstream gateway; by the time a
//! request reaches this service the gateway has resolved the session and
//! stamped `X-Tenant-Id` and `X-Actor-Id` headers onto it. Every handler
//! takes the tenant id from here and nowhere else, which is what keeps
//! cross-tenant reads and writes structurally impossible.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use voxflow_core::error::CoreError;
use voxflow_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Tenant and actor identity resolved by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    /// The tenant whose data this request may touch.
    pub tenant_id: DbId,
    /// The acting user, recorded on promotions and in the audit trail.
    pub actor_id: DbId,
}

fn header_id(parts: &Parts, name: &str) -> Result<DbId, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(format!("Missing {name} header")))
        })?
        .parse()
        .map_err(|_| {
            AppError::Core(CoreError::Unauthorized(format!("Invalid {name} header")))
        })
}

/// Requires a resolved tenant context. Rejects with 401 otherwise.
///
/// ```ignore
/// async fn my_handler(RequireTenant(ctx): RequireTenant) -> AppResult<Json<()>> {
///     tracing::info!(tenant_id = ctx.tenant_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTenant(pub TenantContext);

impl FromRequestParts<AppState> for RequireTenant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let tenant_id = header_id(parts, "x-tenant-id")?;
        let actor_id = header_id(parts, "x-actor-id")?;
        Ok(RequireTenant(TenantContext { tenant_id, actor_id }))
    }
}
