//! Repository for the `flows` table.
//!
//! Every query is scoped by tenant id; a flow belonging to another tenant
//! is indistinguishable from a missing one.

use sqlx::PgPool;
use voxflow_core::types::DbId;

use crate::models::flow::{CreateFlow, Flow, UpdateFlow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tenant_id, name, description, is_template, created_at, updated_at";

/// Provides CRUD operations for flows.
pub struct FlowRepo;

impl FlowRepo {
    /// Insert a new flow for the tenant. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        tenant_id: DbId,
        input: &CreateFlow,
    ) -> Result<Flow, sqlx::Error> {
        let query = format!(
            "INSERT INTO flows (tenant_id, name, description, is_template)
             VALUES ($1, $2, $3, COALESCE($4, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_template)
            .fetch_one(pool)
            .await
    }

    /// Find a flow by id within the tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flows WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Flow>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List the tenant's flows with pagination, newest first.
    pub async fn list_by_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Flow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flows
             WHERE tenant_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a flow. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the flow does not exist within the tenant.
    pub async fn update(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
        input: &UpdateFlow,
    ) -> Result<Option<Flow>, sqlx::Error> {
        let query = format!(
            "UPDATE flows SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                is_template = COALESCE($5, is_template)
             WHERE id = $1 AND tenant_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flow>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_template)
            .fetch_optional(pool)
            .await
    }

    /// Delete a flow and (via cascade) its versions and audit trail.
    /// Returns `true` if a row was removed.
    ///
    /// Whether any bot still references the flow is checked by the caller's
    /// bot-registry collaborator before this is invoked.
    pub async fn delete(pool: &PgPool, tenant_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM flows WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
