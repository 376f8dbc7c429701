//! Flow entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use voxflow_core::types::{DbId, Timestamp};

/// A row from the `flows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Flow {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_template: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new flow. The tenant id comes from the request
/// context, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlow {
    pub name: String,
    pub description: Option<String>,
    pub is_template: Option<bool>,
}

/// DTO for updating a flow. All fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFlow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_template: Option<bool>,
}
