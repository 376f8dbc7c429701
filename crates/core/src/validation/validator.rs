//! The flow graph validator.

use std::collections::HashSet;

use crate::document::{schema_violations, FlowDocument};
use crate::graph::resolve_slots;
use crate::node::NodeType;

use super::report::{GraphViolation, ValidationReport};

/// Validate a flow document.
///
/// Pure function, no side effects. Errors block promotion; warnings are
/// surfaced to the editor but never affect validity.
pub fn validate(doc: &FlowDocument) -> ValidationReport {
    let mut errors: Vec<GraphViolation> = Vec::new();
    let mut warnings: Vec<GraphViolation> = Vec::new();

    // An empty graph gets a single fatal error and no further analysis.
    if doc.nodes.nodes.is_empty() {
        errors.push(GraphViolation::for_graph(
            "empty_graph",
            "flow must contain at least one node",
        ));
        return ValidationReport::from_findings(errors, warnings);
    }

    // Exactly one start node; a missing end node is only advisory.
    let start_count = doc.nodes.start_count();
    if start_count != 1 {
        errors.push(GraphViolation::for_graph(
            "start_count",
            format!("flow must contain exactly one start node, found {start_count}"),
        ));
    }
    if !doc.nodes.has_end_node() {
        warnings.push(GraphViolation::for_graph(
            "no_end_node",
            "flow has no end node; calls will only terminate when the caller hangs up",
        ));
    }

    for node in &doc.nodes.nodes {
        // Per-type configuration constraints.
        for (rule, message) in node.config.constraint_violations() {
            errors.push(GraphViolation::for_node(
                rule,
                &node.id,
                format!("node {}: {message}", node.describe()),
            ));
        }

        // Slot resolution: duplicates, unknown labels, illegal end edges.
        let resolution = resolve_slots(node);
        for (rule, message) in resolution.violations {
            errors.push(GraphViolation::for_node(
                rule,
                &node.id,
                format!("node {}: {message}", node.describe()),
            ));
        }

        // Required slots must be bound; missing optional slots are fine.
        for required in node.node_type().required_slots() {
            if !resolution.slots.contains_key(*required) {
                errors.push(GraphViolation::for_node(
                    "missing_required_slot",
                    &node.id,
                    format!(
                        "node {} is missing required connection '{required}'",
                        node.describe()
                    ),
                ));
            }
        }

        // Declared decision conditions without a bound slot still validate,
        // but the branch can never be taken.
        if node.node_type() == NodeType::Decision {
            for condition_id in node.config.condition_ids() {
                if !resolution.slots.contains_key(condition_id) {
                    warnings.push(GraphViolation::for_node(
                        "unreachable_condition",
                        &node.id,
                        format!(
                            "node {}: condition '{condition_id}' has no connection and can \
                             never be taken",
                            node.describe()
                        ),
                    ));
                }
            }
        }
    }

    // Reachability: every non-start node should be the target of at least
    // one connection. Disconnected nodes do not block promotion.
    let targets: HashSet<&str> = doc.nodes.connection_targets();
    for node in &doc.nodes.nodes {
        if node.node_type() != NodeType::Start && !targets.contains(node.id.as_str()) {
            warnings.push(GraphViolation::for_node(
                "unreachable_node",
                &node.id,
                format!("node {} has no incoming connections", node.describe()),
            ));
        }
    }

    // Canonical-schema conformance over the re-serialized document.
    errors.extend(schema_violations(doc));

    ValidationReport::from_findings(errors, warnings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
