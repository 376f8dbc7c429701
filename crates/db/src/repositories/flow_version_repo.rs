//! Repository for the `flow_versions` table: the version store and the
//! promotion engine.
//!
//! Mutations run in a transaction scoped to the owning flow, serialized by
//! a `FOR UPDATE` lock on the flow row. Lifecycle guards are re-evaluated
//! after the lock is held, so concurrent promotions for the same flow are
//! decided strictly one after the other; the loser sees the winner's state
//! and fails with a conflict instead of corrupting the single-live
//! invariant. The partial unique indexes on `flow_versions` backstop all of
//! this at the schema level.

use sqlx::{PgConnection, PgPool};
use voxflow_core::audit::AuditEvent;
use voxflow_core::document::FlowDocument;
use voxflow_core::error::CoreError;
use voxflow_core::lifecycle::{self, PromoteTarget, VersionStatus};
use voxflow_core::types::DbId;
use voxflow_core::validation::validate;

use crate::error::StoreResult;
use crate::models::flow_version::FlowVersion;
use crate::repositories::AuditLogRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, flow_id, version_number, status, graph, graph_hash, \
    promoted_by, created_at, updated_at";

/// Version store and promotion engine for flow versions.
pub struct FlowVersionRepo;

impl FlowVersionRepo {
    // ── Draft lifecycle ──────────────────────────────────────────────

    /// Create the flow's next draft version.
    ///
    /// Fails with `Conflict` if the flow already has a draft. The version
    /// number is `max(existing) + 1`, starting at 1; numbers are never
    /// reused, even across promote/archive cycles.
    pub async fn create_draft(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
        doc: &FlowDocument,
    ) -> StoreResult<FlowVersion> {
        let mut tx = pool.begin().await?;

        if !lock_flow(&mut *tx, tenant_id, flow_id).await? {
            return Err(CoreError::NotFound { entity: "Flow", id: flow_id }.into());
        }

        let (has_draft,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM flow_versions WHERE flow_id = $1 AND status = 'draft')",
        )
        .bind(flow_id)
        .fetch_one(&mut *tx)
        .await?;
        if has_draft {
            return Err(CoreError::Conflict(
                "flow already has a draft version".to_string(),
            )
            .into());
        }

        let query = format!(
            "INSERT INTO flow_versions (flow_id, version_number, status, graph, graph_hash)
             VALUES (
                $1,
                (SELECT COALESCE(MAX(version_number), 0) + 1 FROM flow_versions WHERE flow_id = $1),
                'draft', $2, $3
             )
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, FlowVersion>(&query)
            .bind(flow_id)
            .bind(sqlx::types::Json(doc))
            .bind(doc.content_hash())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(version)
    }

    /// Replace a draft's graph document in place.
    ///
    /// Fails with `InvalidState` unless the version is a draft. The version
    /// number never changes on update.
    pub async fn update_draft(
        pool: &PgPool,
        tenant_id: DbId,
        version_id: DbId,
        doc: &FlowDocument,
    ) -> StoreResult<FlowVersion> {
        let mut tx = pool.begin().await?;

        let current = lock_and_fetch(&mut *tx, tenant_id, version_id).await?;
        lifecycle::check_update_draft(current.status)?;

        let query = format!(
            "UPDATE flow_versions SET graph = $2, graph_hash = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, FlowVersion>(&query)
            .bind(version_id)
            .bind(sqlx::types::Json(doc))
            .bind(doc.content_hash())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(version)
    }

    // ── Promotion ────────────────────────────────────────────────────

    /// Promote a version to `staged` or `live`.
    ///
    /// The stored graph must validate cleanly. Promoting to `live` demotes
    /// the flow's current live version (if any) to `archived` in the same
    /// transaction, and both transitions are written to the audit log, so
    /// no reader ever observes zero or two live versions.
    pub async fn promote(
        pool: &PgPool,
        tenant_id: DbId,
        version_id: DbId,
        target: PromoteTarget,
        actor_id: DbId,
    ) -> StoreResult<FlowVersion> {
        let mut tx = pool.begin().await?;

        let current = lock_and_fetch(&mut *tx, tenant_id, version_id).await?;
        lifecycle::check_promote(current.status, target)?;

        let report = validate(current.document());
        if !report.is_valid {
            return Err(CoreError::Validation(format!(
                "graph has {} validation error(s); promotion blocked",
                report.errors.len()
            ))
            .into());
        }

        if target == PromoteTarget::Live {
            let query = format!(
                "SELECT {COLUMNS} FROM flow_versions
                 WHERE flow_id = $1 AND status = 'live' AND id <> $2"
            );
            let old_live = sqlx::query_as::<_, FlowVersion>(&query)
                .bind(current.flow_id)
                .bind(version_id)
                .fetch_optional(&mut *tx)
                .await?;

            if let Some(old) = old_live {
                sqlx::query("UPDATE flow_versions SET status = 'archived' WHERE id = $1")
                    .bind(old.id)
                    .execute(&mut *tx)
                    .await?;
                AuditLogRepo::record(
                    &mut *tx,
                    tenant_id,
                    &AuditEvent::archived(
                        old.flow_id,
                        old.id,
                        old.version_number,
                        VersionStatus::Live,
                        actor_id,
                    ),
                )
                .await?;
            }
        }

        let query = format!(
            "UPDATE flow_versions SET status = $2, promoted_by = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, FlowVersion>(&query)
            .bind(version_id)
            .bind(target.as_status())
            .bind(actor_id)
            .fetch_one(&mut *tx)
            .await?;

        AuditLogRepo::record(
            &mut *tx,
            tenant_id,
            &AuditEvent::promoted(
                version.flow_id,
                version.id,
                version.version_number,
                current.status,
                target.as_status(),
                actor_id,
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(version)
    }

    /// Archive a draft or staged version directly.
    ///
    /// Live versions are refused with `InvalidState`; they only leave
    /// `live` by being superseded inside [`FlowVersionRepo::promote`].
    pub async fn archive(
        pool: &PgPool,
        tenant_id: DbId,
        version_id: DbId,
        actor_id: DbId,
    ) -> StoreResult<FlowVersion> {
        let mut tx = pool.begin().await?;

        let current = lock_and_fetch(&mut *tx, tenant_id, version_id).await?;
        lifecycle::check_archive(current.status)?;

        let query = format!(
            "UPDATE flow_versions SET status = 'archived'
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, FlowVersion>(&query)
            .bind(version_id)
            .fetch_one(&mut *tx)
            .await?;

        AuditLogRepo::record(
            &mut *tx,
            tenant_id,
            &AuditEvent::archived(
                version.flow_id,
                version.id,
                version.version_number,
                current.status,
                actor_id,
            ),
        )
        .await?;

        tx.commit().await?;
        Ok(version)
    }

    // ── Finders ──────────────────────────────────────────────────────

    /// Find a version by id within the tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: DbId,
        id: DbId,
    ) -> Result<Option<FlowVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flow_versions
             WHERE id = $1
               AND flow_id IN (SELECT id FROM flows WHERE tenant_id = $2)"
        );
        sqlx::query_as::<_, FlowVersion>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// List a flow's versions, newest version number first.
    pub async fn list_by_flow(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
    ) -> Result<Vec<FlowVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flow_versions
             WHERE flow_id = $1
               AND flow_id IN (SELECT id FROM flows WHERE tenant_id = $2)
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, FlowVersion>(&query)
            .bind(flow_id)
            .bind(tenant_id)
            .fetch_all(pool)
            .await
    }

    /// The flow's current draft, if any.
    pub async fn find_draft(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
    ) -> Result<Option<FlowVersion>, sqlx::Error> {
        Self::find_by_status(pool, tenant_id, flow_id, VersionStatus::Draft).await
    }

    /// The flow's current live version, if any.
    pub async fn find_live(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
    ) -> Result<Option<FlowVersion>, sqlx::Error> {
        Self::find_by_status(pool, tenant_id, flow_id, VersionStatus::Live).await
    }

    async fn find_by_status(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
        status: VersionStatus,
    ) -> Result<Option<FlowVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flow_versions
             WHERE flow_id = $1 AND status = $2
               AND flow_id IN (SELECT id FROM flows WHERE tenant_id = $3)"
        );
        sqlx::query_as::<_, FlowVersion>(&query)
            .bind(flow_id)
            .bind(status)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// The version number the next draft would get (max existing + 1).
    pub async fn next_version_number(
        pool: &PgPool,
        tenant_id: DbId,
        flow_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) + 1 FROM flow_versions \
             WHERE flow_id = $1 \
               AND flow_id IN (SELECT id FROM flows WHERE tenant_id = $2)",
        )
        .bind(flow_id)
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

/// Take the per-flow lock. Returns `false` when the flow does not exist
/// within the tenant.
async fn lock_flow(
    conn: &mut PgConnection,
    tenant_id: DbId,
    flow_id: DbId,
) -> Result<bool, sqlx::Error> {
    let row: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM flows WHERE id = $1 AND tenant_id = $2 FOR UPDATE")
            .bind(flow_id)
            .bind(tenant_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Resolve a version id to its flow, take the per-flow lock, then re-read
/// the version row under the lock. The status returned here is the one the
/// transition guards run against.
async fn lock_and_fetch(
    conn: &mut PgConnection,
    tenant_id: DbId,
    version_id: DbId,
) -> StoreResult<FlowVersion> {
    let not_found = || CoreError::NotFound { entity: "FlowVersion", id: version_id };

    let flow: Option<(DbId,)> = sqlx::query_as(
        "SELECT v.flow_id FROM flow_versions v \
         JOIN flows f ON f.id = v.flow_id \
         WHERE v.id = $1 AND f.tenant_id = $2",
    )
    .bind(version_id)
    .bind(tenant_id)
    .fetch_optional(&mut *conn)
    .await?;
    let (flow_id,) = flow.ok_or_else(not_found)?;

    if !lock_flow(&mut *conn, tenant_id, flow_id).await? {
        return Err(not_found().into());
    }

    let query = format!("SELECT {COLUMNS} FROM flow_versions WHERE id = $1");
    sqlx::query_as::<_, FlowVersion>(&query)
        .bind(version_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found().into())
}
