//! Canonical exchange document for a flow graph.
//!
//! This is the unit persisted inside a flow version and handed to the
//! (out-of-scope) call runtime: schema version, metadata, flow-level
//! settings, declared variables, and the node list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::FlowGraph;
use crate::hashing::sha256_hex;
use crate::types::Timestamp;
use crate::validation::GraphViolation;

/// Exchange schema version this build reads and writes.
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f64>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            provider: "default".to_string(),
            voice_id: String::new(),
            speaking_rate: None,
        }
    }
}

/// What the runtime does when a node errors out more times than allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPolicy {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_message: Option<String>,
    #[serde(default)]
    pub transfer_on_failure: bool,
}

fn default_max_retries() -> u32 {
    2
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            fallback_message: None,
            transfer_on_failure: false,
        }
    }
}

/// Flow-level configuration block of the exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub voice: VoiceSettings,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u32,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_max_turns() -> u32 {
    50
}

fn default_max_duration_secs() -> u32 {
    1800
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            system_prompt: None,
            locale: default_locale(),
            voice: VoiceSettings::default(),
            max_turns: default_max_turns(),
            max_duration_secs: default_max_duration_secs(),
            error_policy: ErrorPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Json,
}

/// A variable declared at flow scope, readable by nodes at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    #[serde(default = "default_variable_type")]
    pub var_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

fn default_variable_type() -> VariableType {
    VariableType::String
}

/// The complete exchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub settings: FlowSettings,
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub nodes: FlowGraph,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for FlowDocument {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            metadata: DocumentMetadata::default(),
            settings: FlowSettings::default(),
            variables: Vec::new(),
            nodes: FlowGraph::default(),
        }
    }
}

impl FlowDocument {
    /// Wrap a bare graph in a document with default metadata and settings.
    pub fn from_graph(name: impl Into<String>, nodes: FlowGraph) -> Self {
        Self {
            metadata: DocumentMetadata {
                name: name.into(),
                ..DocumentMetadata::default()
            },
            nodes,
            ..Self::default()
        }
    }

    /// Deterministic SHA-256 hash of the document content, used for change
    /// detection on draft updates.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        sha256_hex(canonical.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Schema-level validation
// ---------------------------------------------------------------------------

/// Check the document against the exchange schema: supported schema version,
/// well-formed identifiers, and referential integrity of connections.
///
/// Violations carry a JSON-path-style `path` into the document.
pub fn schema_violations(doc: &FlowDocument) -> Vec<GraphViolation> {
    let mut out = Vec::new();

    if doc.schema_version != SCHEMA_VERSION {
        out.push(GraphViolation::at_path(
            "unsupported_schema_version",
            "schema_version".to_string(),
            format!(
                "unsupported schema version '{}', expected '{SCHEMA_VERSION}'",
                doc.schema_version
            ),
        ));
    }

    if doc.metadata.name.trim().is_empty() {
        out.push(GraphViolation::at_path(
            "empty_name",
            "metadata.name".to_string(),
            "document name must not be empty",
        ));
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for (i, node) in doc.nodes.nodes.iter().enumerate() {
        if node.id.trim().is_empty() {
            out.push(GraphViolation::at_path(
                "empty_node_id",
                format!("nodes[{i}].id"),
                "node id must not be empty",
            ));
        } else if !seen_ids.insert(&node.id) {
            out.push(
                GraphViolation::at_path(
                    "duplicate_node_id",
                    format!("nodes[{i}].id"),
                    format!("node id '{}' is used more than once", node.id),
                )
                .with_node(&node.id),
            );
        }
    }

    // Connection targets must reference nodes that exist in this graph.
    let known_ids: HashSet<&str> = doc.nodes.nodes.iter().map(|n| n.id.as_str()).collect();
    for (i, node) in doc.nodes.nodes.iter().enumerate() {
        for (j, spec) in node.connections.iter().enumerate() {
            if let Some(slot) = &spec.slot {
                if slot.trim().is_empty() {
                    out.push(
                        GraphViolation::at_path(
                            "empty_slot_label",
                            format!("nodes[{i}].connections[{j}].slot"),
                            "slot label must not be empty",
                        )
                        .with_node(&node.id),
                    );
                }
            }
            if !known_ids.contains(spec.target.as_str()) {
                out.push(
                    GraphViolation::at_path(
                        "unknown_target",
                        format!("nodes[{i}].connections[{j}].target"),
                        format!("connection targets unknown node '{}'", spec.target),
                    )
                    .with_node(&node.id),
                );
            }
        }
    }

    let mut seen_vars: HashSet<&str> = HashSet::new();
    for (i, var) in doc.variables.iter().enumerate() {
        if var.name.trim().is_empty() {
            out.push(GraphViolation::at_path(
                "empty_variable_name",
                format!("variables[{i}].name"),
                "variable name must not be empty",
            ));
        } else if !seen_vars.insert(&var.name) {
            out.push(GraphViolation::at_path(
                "duplicate_variable_name",
                format!("variables[{i}].name"),
                format!("variable '{}' is declared more than once", var.name),
            ));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
