//! Validation report types.

use serde::{Deserialize, Serialize};

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphViolation {
    /// Stable machine-readable rule name, e.g. `missing_required_slot`.
    pub rule: String,
    /// Id of the node the finding is scoped to, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// JSON-path-style location in the exchange document, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl GraphViolation {
    /// A finding scoped to a node.
    pub fn for_node(rule: &str, node_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            node_id: Some(node_id.to_string()),
            path: None,
            message: message.into(),
        }
    }

    /// A finding about the graph as a whole.
    pub fn for_graph(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            node_id: None,
            path: None,
            message: message.into(),
        }
    }

    /// A finding anchored at a document field path.
    pub fn at_path(rule: &str, path: String, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            node_id: None,
            path: Some(path),
            message: message.into(),
        }
    }

    pub fn with_node(mut self, node_id: &str) -> Self {
        self.node_id = Some(node_id.to_string());
        self
    }
}

/// Aggregated result of validating one flow document.
///
/// `is_valid` is true iff `errors` is empty; warnings never affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<GraphViolation>,
    pub warnings: Vec<GraphViolation>,
}

impl ValidationReport {
    pub(crate) fn from_findings(
        errors: Vec<GraphViolation>,
        warnings: Vec<GraphViolation>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
