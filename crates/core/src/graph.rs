//! In-memory flow graph model.
//!
//! Nodes are stored flat and keyed by opaque string identifiers; connections
//! are identifier pairs plus an optional slot label, so loops (retry edges
//! back to an earlier node) are ordinary edges with no ownership
//! implications.

use std::collections::{BTreeMap, HashSet};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::node::{slots, NodeConfig, NodeType};

// ---------------------------------------------------------------------------
// Graph data structures
// ---------------------------------------------------------------------------

/// Canvas position. Not semantically meaningful; retained for round-tripping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A raw outgoing edge as authored by the editor.
///
/// `slot: None` means "the primary slot of the source node's type".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    pub target: String,
}

/// A single node of a flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub position: Position,
    pub config: NodeConfig,
    pub connections: Vec<ConnectionSpec>,
}

impl FlowNode {
    /// The node's type, derived from its configuration variant.
    pub fn node_type(&self) -> NodeType {
        self.config.node_type()
    }

    /// Short identification used in validation messages: label plus type.
    pub fn describe(&self) -> String {
        format!("'{}' ({})", self.label, self.node_type())
    }
}

/// The node set of a flow. Serialized as a plain node list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of nodes with type `start`.
    pub fn start_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.node_type() == NodeType::Start)
            .count()
    }

    pub fn has_end_node(&self) -> bool {
        self.nodes.iter().any(|n| n.node_type() == NodeType::End)
    }

    /// Ids of every node that is the target of at least one connection.
    pub fn connection_targets(&self) -> HashSet<&str> {
        self.nodes
            .iter()
            .flat_map(|n| n.connections.iter().map(|c| c.target.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Node (de)serialization
// ---------------------------------------------------------------------------

/// Wire shape of a node in the exchange document. The `type` field selects
/// the config variant; the config payload itself is untagged.
#[derive(Serialize, Deserialize)]
struct NodeRepr {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    config: serde_json::Value,
    #[serde(default)]
    connections: Vec<ConnectionSpec>,
}

impl Serialize for FlowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = NodeRepr {
            id: self.id.clone(),
            node_type: self.node_type(),
            label: self.label.clone(),
            description: self.description.clone(),
            position: self.position,
            config: self.config.to_value().map_err(S::Error::custom)?,
            connections: self.connections.clone(),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FlowNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = NodeRepr::deserialize(deserializer)?;
        let config = NodeConfig::from_value(repr.node_type, repr.config).map_err(|e| {
            D::Error::custom(format!(
                "invalid config for node '{}' ({}): {e}",
                repr.id, repr.node_type
            ))
        })?;
        Ok(FlowNode {
            id: repr.id,
            label: repr.label,
            description: repr.description,
            position: repr.position,
            config,
            connections: repr.connections,
        })
    }
}

// ---------------------------------------------------------------------------
// Connection resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a node's raw edges into its slot map.
#[derive(Debug, Default, PartialEq)]
pub struct SlotResolution {
    /// Resolved slot name → target node id.
    pub slots: BTreeMap<String, String>,
    /// `(rule, message)` pairs for edges that could not be bound cleanly.
    pub violations: Vec<(&'static str, String)>,
}

/// Resolve a node's raw edge list into its slot → target mapping.
///
/// A labeled edge binds the matching legal slot for the node's type; an
/// unlabeled edge binds the type's primary slot. Decision nodes bind edges
/// labeled with a declared condition id to that condition's slot and let any
/// other label fall through to `default`. A second edge landing on an
/// already-bound slot is a duplicate; resolution records it and keeps the
/// first binding.
pub fn resolve_slots(node: &FlowNode) -> SlotResolution {
    let mut resolution = SlotResolution::default();
    let node_type = node.node_type();

    if node_type == NodeType::End {
        if !node.connections.is_empty() {
            resolution.violations.push((
                "illegal_connection",
                "end nodes permit no outgoing connections".to_string(),
            ));
        }
        return resolution;
    }

    let condition_ids: Vec<String> = node
        .config
        .condition_ids()
        .into_iter()
        .map(str::to_string)
        .collect();

    for spec in &node.connections {
        let slot: &str = match &spec.slot {
            Some(label) => {
                if node_type.required_slots().contains(&label.as_str())
                    || node_type.optional_slots().contains(&label.as_str())
                {
                    label
                } else if node_type == NodeType::Decision {
                    if condition_ids.iter().any(|id| id == label) {
                        label
                    } else {
                        // Labels that match no condition fall through to the
                        // default branch.
                        slots::DEFAULT
                    }
                } else {
                    resolution.violations.push((
                        "unknown_slot",
                        format!("'{label}' is not a legal slot for {node_type} nodes"),
                    ));
                    continue;
                }
            }
            None => match node_type.primary_slot() {
                Some(primary) => primary,
                None => continue,
            },
        };

        if resolution.slots.contains_key(slot) {
            resolution.violations.push((
                "duplicate_slot",
                format!("duplicate connection for slot '{slot}'"),
            ));
        } else {
            resolution
                .slots
                .insert(slot.to_string(), spec.target.clone());
        }
    }

    resolution
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
