//! Audit event types for version lifecycle transitions.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and any future worker or CLI tooling. The
//! repository writes one entry per transition inside the same transaction
//! that applies it, so the trail can never disagree with the stored state.

use crate::lifecycle::VersionStatus;
use crate::types::DbId;

/// Known action types for flow audit entries.
pub mod actions {
    pub const VERSION_PROMOTED: &str = "version_promoted";
    pub const VERSION_ARCHIVED: &str = "version_archived";
}

/// One lifecycle transition, as reported to the audit sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub action: &'static str,
    pub flow_id: DbId,
    pub version_id: DbId,
    pub version_number: i32,
    pub prior_status: Option<VersionStatus>,
    pub new_status: VersionStatus,
    pub actor_id: DbId,
}

impl AuditEvent {
    /// Event for a version reaching `staged` or `live`.
    pub fn promoted(
        flow_id: DbId,
        version_id: DbId,
        version_number: i32,
        prior_status: VersionStatus,
        new_status: VersionStatus,
        actor_id: DbId,
    ) -> Self {
        Self {
            action: actions::VERSION_PROMOTED,
            flow_id,
            version_id,
            version_number,
            prior_status: Some(prior_status),
            new_status,
            actor_id,
        }
    }

    /// Event for a version reaching `archived`, whether directly or by
    /// being superseded during a promotion.
    pub fn archived(
        flow_id: DbId,
        version_id: DbId,
        version_number: i32,
        prior_status: VersionStatus,
        actor_id: DbId,
    ) -> Self {
        Self {
            action: actions::VERSION_ARCHIVED,
            flow_id,
            version_id,
            version_number,
            prior_status: Some(prior_status),
            new_status: VersionStatus::Archived,
            actor_id,
        }
    }
}
