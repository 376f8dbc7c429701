//! Version lifecycle: statuses and pure transition guards.
//!
//! The guards encode the legal transitions of the draft → staged → live →
//! archived state machine. They are consulted inside the storage
//! transaction, after the flow's rows are locked, so the status they see is
//! the one the transition will be applied to.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a flow version. `archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(
    feature = "sqlx",
    derive(sqlx::Type),
    sqlx(type_name = "version_status", rename_all = "lowercase")
)]
pub enum VersionStatus {
    Draft,
    Staged,
    Live,
    Archived,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Staged => "staged",
            VersionStatus::Live => "live",
            VersionStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses a version can be promoted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoteTarget {
    Staged,
    Live,
}

impl PromoteTarget {
    pub fn as_status(&self) -> VersionStatus {
        match self {
            PromoteTarget::Staged => VersionStatus::Staged,
            PromoteTarget::Live => VersionStatus::Live,
        }
    }
}

impl std::fmt::Display for PromoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_status().as_str())
    }
}

/// Guard for editing a version's graph payload in place.
///
/// Only drafts are mutable; staged, live and archived payloads are
/// immutable snapshots.
pub fn check_update_draft(status: VersionStatus) -> Result<(), CoreError> {
    match status {
        VersionStatus::Draft => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "only draft versions can be edited, this version is {other}"
        ))),
    }
}

/// Guard for promoting a version to `staged` or `live`.
///
/// Finding the version already at the requested status, or finding it
/// archived, means a concurrent promotion got there first; both are
/// reported as conflicts so the caller re-fetches and retries. Transitions
/// that were never legal (live → staged, and so on) are invalid-state
/// failures.
pub fn check_promote(status: VersionStatus, target: PromoteTarget) -> Result<(), CoreError> {
    if status == target.as_status() {
        return Err(CoreError::Conflict(format!(
            "version is already {status}; a concurrent promotion may have completed first"
        )));
    }
    if status == VersionStatus::Archived {
        return Err(CoreError::Conflict(
            "version was superseded by a concurrent promotion and is archived".to_string(),
        ));
    }
    match (status, target) {
        (VersionStatus::Draft, PromoteTarget::Staged) => Ok(()),
        (VersionStatus::Draft | VersionStatus::Staged, PromoteTarget::Live) => Ok(()),
        (from, to) => Err(CoreError::InvalidState(format!(
            "cannot promote a {from} version to {to}"
        ))),
    }
}

/// Guard for archiving a version directly.
///
/// A live version may only leave `live` by being superseded inside a
/// promotion; direct archival of it is refused.
pub fn check_archive(status: VersionStatus) -> Result<(), CoreError> {
    match status {
        VersionStatus::Live => Err(CoreError::InvalidState(
            "live versions cannot be archived directly; promote a successor instead".to_string(),
        )),
        VersionStatus::Archived => Err(CoreError::InvalidState(
            "version is already archived".to_string(),
        )),
        VersionStatus::Draft | VersionStatus::Staged => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn only_drafts_are_editable() {
        assert!(check_update_draft(VersionStatus::Draft).is_ok());
        for status in [VersionStatus::Staged, VersionStatus::Live, VersionStatus::Archived] {
            assert_matches!(
                check_update_draft(status),
                Err(CoreError::InvalidState(_)),
                "{status}"
            );
        }
    }

    #[test]
    fn draft_promotes_to_staged_and_live() {
        assert!(check_promote(VersionStatus::Draft, PromoteTarget::Staged).is_ok());
        assert!(check_promote(VersionStatus::Draft, PromoteTarget::Live).is_ok());
    }

    #[test]
    fn staged_promotes_to_live_only() {
        assert!(check_promote(VersionStatus::Staged, PromoteTarget::Live).is_ok());
        assert_matches!(
            check_promote(VersionStatus::Staged, PromoteTarget::Staged),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn promoting_to_current_status_is_conflict() {
        assert_matches!(
            check_promote(VersionStatus::Live, PromoteTarget::Live),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn promoting_archived_version_is_conflict() {
        // The only way a caller holds an archived version it believed was
        // promotable is a lost race.
        for target in [PromoteTarget::Staged, PromoteTarget::Live] {
            assert_matches!(
                check_promote(VersionStatus::Archived, target),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn live_cannot_go_back_to_staged() {
        assert_matches!(
            check_promote(VersionStatus::Live, PromoteTarget::Staged),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn archiving_live_version_is_invalid_state() {
        assert_matches!(check_archive(VersionStatus::Live), Err(CoreError::InvalidState(_)));
    }

    #[test]
    fn archiving_terminal_version_is_invalid_state() {
        assert_matches!(
            check_archive(VersionStatus::Archived),
            Err(CoreError::InvalidState(_))
        );
    }

    #[test]
    fn drafts_and_staged_versions_can_be_archived() {
        assert!(check_archive(VersionStatus::Draft).is_ok());
        assert!(check_archive(VersionStatus::Staged).is_ok());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&VersionStatus::Live).unwrap(), "\"live\"");
        let status: VersionStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, VersionStatus::Archived);
    }
}
