//! Repository for the `flow_audit_log` table.

use sqlx::{PgConnection, PgPool};
use voxflow_core::audit::AuditEvent;
use voxflow_core::types::DbId;

use crate::models::audit_log::FlowAuditEntry;

const COLUMNS: &str = "id, tenant_id, flow_id, version_id, version_number, action, \
    prior_status, new_status, actor_id, created_at";

/// Writes and reads lifecycle audit entries.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Record one transition. Takes a bare connection so callers can write
    /// the entry inside the transaction that applies the transition.
    pub async fn record(
        conn: &mut PgConnection,
        tenant_id: DbId,
        event: &AuditEvent,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO flow_audit_log
                (tenant_id, flow_id, version_id, version_number, action,
                 prior_status, new_status, actor_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(tenant_id)
        .bind(event.flow_id)
        .bind(event.version_id)
        .bind(event.version_number)
        .bind(event.action)
        .bind(event.prior_status)
        .bind(event.new_status)
        .bind(event.actor_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// List a flow's audit trail, newest first.
    pub async fn list_by_flow(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
    ) -> Result<Vec<FlowAuditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flow_audit_log
             WHERE flow_id = $1 AND tenant_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FlowAuditEntry>(&query)
            .bind(flow_id)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }
}
