//! Flow version entity model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use voxflow_core::document::FlowDocument;
use voxflow_core::lifecycle::VersionStatus;
use voxflow_core::types::{DbId, Timestamp};

/// A row from the `flow_versions` table.
///
/// `graph` is the canonical exchange document; once the row leaves `draft`
/// it is never rewritten.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FlowVersion {
    pub id: DbId,
    pub flow_id: DbId,
    pub version_number: i32,
    pub status: VersionStatus,
    pub graph: Json<FlowDocument>,
    pub graph_hash: String,
    pub promoted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FlowVersion {
    /// Borrow the embedded document.
    pub fn document(&self) -> &FlowDocument {
        &self.graph.0
    }
}
