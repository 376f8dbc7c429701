//! Audit log entity model.

use serde::Serialize;
use sqlx::FromRow;
use voxflow_core::lifecycle::VersionStatus;
use voxflow_core::types::{DbId, Timestamp};

/// A row from the `flow_audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FlowAuditEntry {
    pub id: DbId,
    pub tenant_id: DbId,
    pub flow_id: DbId,
    pub version_id: DbId,
    pub version_number: i32,
    pub action: String,
    pub prior_status: Option<VersionStatus>,
    pub new_status: VersionStatus,
    pub actor_id: DbId,
    pub created_at: Timestamp,
}
