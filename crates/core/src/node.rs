//! Node type catalog: the nine call-script node types, their outgoing
//! connection slots, and their per-type configuration shapes.
//!
//! The catalog is a pure lookup table. Slot legality and configuration
//! constraints are resolved through exhaustive matching on [`NodeType`] and
//! [`NodeConfig`]; there is no mutable registry state.

use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

// ---------------------------------------------------------------------------
// Slot name constants
// ---------------------------------------------------------------------------

/// Outgoing connection slot names used across node types.
pub mod slots {
    pub const NEXT: &str = "next";
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
    pub const TIMEOUT: &str = "timeout";
    pub const NO_INPUT: &str = "noInput";
    pub const DEFAULT: &str = "default";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const INCOMPLETE: &str = "incomplete";
}

/// Action type that requires a well-formed URL in its configuration.
pub const ACTION_TYPE_API_CALL: &str = "api_call";

/// HTTP methods accepted in a webhook node configuration.
pub const WEBHOOK_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Inclusive bounds for the listen-node timeout, in seconds.
pub const LISTEN_TIMEOUT_MIN_SECS: u32 = 5;
pub const LISTEN_TIMEOUT_MAX_SECS: u32 = 60;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// The fixed set of node types a flow graph may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Start,
    Say,
    Listen,
    Decision,
    Action,
    Transfer,
    CollectInfo,
    Webhook,
    End,
}

impl NodeType {
    /// The wire name of this node type, as it appears in the exchange
    /// document's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::Say => "say",
            NodeType::Listen => "listen",
            NodeType::Decision => "decision",
            NodeType::Action => "action",
            NodeType::Transfer => "transfer",
            NodeType::CollectInfo => "collect_info",
            NodeType::Webhook => "webhook",
            NodeType::End => "end",
        }
    }

    /// Connection slots that must be bound for a node of this type to be
    /// promotable.
    pub fn required_slots(&self) -> &'static [&'static str] {
        match self {
            NodeType::Start | NodeType::Say => &[slots::NEXT],
            NodeType::Listen | NodeType::Action | NodeType::CollectInfo | NodeType::Webhook => {
                &[slots::SUCCESS]
            }
            NodeType::Decision => &[slots::DEFAULT],
            NodeType::Transfer => &[slots::COMPLETED],
            NodeType::End => &[],
        }
    }

    /// Statically named optional slots. Decision nodes additionally accept
    /// one slot per declared condition id; those are resolved against the
    /// node's configuration, not this table.
    pub fn optional_slots(&self) -> &'static [&'static str] {
        match self {
            NodeType::Start => &[],
            NodeType::Say => &[slots::TIMEOUT],
            NodeType::Listen => &[slots::TIMEOUT, slots::NO_INPUT, slots::ERROR],
            NodeType::Decision => &[],
            NodeType::Action => &[slots::ERROR, slots::TIMEOUT],
            NodeType::Transfer => &[slots::FAILED, slots::TIMEOUT],
            NodeType::CollectInfo => &[slots::INCOMPLETE, slots::ERROR],
            NodeType::Webhook => &[slots::ERROR],
            NodeType::End => &[],
        }
    }

    /// The slot an unlabeled edge resolves to. `None` for end nodes, which
    /// permit no outgoing connections.
    pub fn primary_slot(&self) -> Option<&'static str> {
        match self {
            NodeType::Start | NodeType::Say => Some(slots::NEXT),
            NodeType::Listen | NodeType::Action | NodeType::CollectInfo | NodeType::Webhook => {
                Some(slots::SUCCESS)
            }
            NodeType::Decision => Some(slots::DEFAULT),
            NodeType::Transfer => Some(slots::COMPLETED),
            NodeType::End => None,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Per-type configuration payloads
// ---------------------------------------------------------------------------

/// One branch of a decision node. `id` names the condition's outgoing slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// One field gathered by a collect_info node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectField {
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartConfig {
    #[serde(default)]
    pub greeting: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SayConfig {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen_timeout")]
    pub timeout_secs: u32,
}

fn default_listen_timeout() -> u32 {
    10
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_listen_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(default)]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub transfer_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectInfoConfig {
    #[serde(default)]
    pub fields: Vec<CollectField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_webhook_method")]
    pub method: String,
}

fn default_webhook_method() -> String {
    "POST".to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: default_webhook_method(),
        }
    }
}

/// Type-specific node configuration, one variant per [`NodeType`].
///
/// The variant is selected by the node-level `type` field of the exchange
/// document, so the serialized config payload itself carries no tag.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Start(StartConfig),
    Say(SayConfig),
    Listen(ListenConfig),
    Decision(DecisionConfig),
    Action(ActionConfig),
    Transfer(TransferConfig),
    CollectInfo(CollectInfoConfig),
    Webhook(WebhookConfig),
    End,
}

impl NodeConfig {
    /// The node type this configuration belongs to.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeConfig::Start(_) => NodeType::Start,
            NodeConfig::Say(_) => NodeType::Say,
            NodeConfig::Listen(_) => NodeType::Listen,
            NodeConfig::Decision(_) => NodeType::Decision,
            NodeConfig::Action(_) => NodeType::Action,
            NodeConfig::Transfer(_) => NodeType::Transfer,
            NodeConfig::CollectInfo(_) => NodeType::CollectInfo,
            NodeConfig::Webhook(_) => NodeType::Webhook,
            NodeConfig::End => NodeType::End,
        }
    }

    /// A default configuration for the given node type.
    pub fn default_for(node_type: NodeType) -> NodeConfig {
        match node_type {
            NodeType::Start => NodeConfig::Start(StartConfig::default()),
            NodeType::Say => NodeConfig::Say(SayConfig::default()),
            NodeType::Listen => NodeConfig::Listen(ListenConfig::default()),
            NodeType::Decision => NodeConfig::Decision(DecisionConfig::default()),
            NodeType::Action => NodeConfig::Action(ActionConfig::default()),
            NodeType::Transfer => NodeConfig::Transfer(TransferConfig::default()),
            NodeType::CollectInfo => NodeConfig::CollectInfo(CollectInfoConfig::default()),
            NodeType::Webhook => NodeConfig::Webhook(WebhookConfig::default()),
            NodeType::End => NodeConfig::End,
        }
    }

    /// Parse a raw config payload for the given node type. An absent
    /// payload parses as the type's defaults.
    pub fn from_value(
        node_type: NodeType,
        value: serde_json::Value,
    ) -> Result<NodeConfig, serde_json::Error> {
        let value = match value {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other,
        };
        Ok(match node_type {
            NodeType::Start => NodeConfig::Start(serde_json::from_value(value)?),
            NodeType::Say => NodeConfig::Say(serde_json::from_value(value)?),
            NodeType::Listen => NodeConfig::Listen(serde_json::from_value(value)?),
            NodeType::Decision => NodeConfig::Decision(serde_json::from_value(value)?),
            NodeType::Action => NodeConfig::Action(serde_json::from_value(value)?),
            NodeType::Transfer => NodeConfig::Transfer(serde_json::from_value(value)?),
            NodeType::CollectInfo => NodeConfig::CollectInfo(serde_json::from_value(value)?),
            NodeType::Webhook => NodeConfig::Webhook(serde_json::from_value(value)?),
            NodeType::End => NodeConfig::End,
        })
    }

    /// Serialize the config payload to its document representation.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            NodeConfig::Start(c) => serde_json::to_value(c),
            NodeConfig::Say(c) => serde_json::to_value(c),
            NodeConfig::Listen(c) => serde_json::to_value(c),
            NodeConfig::Decision(c) => serde_json::to_value(c),
            NodeConfig::Action(c) => serde_json::to_value(c),
            NodeConfig::Transfer(c) => serde_json::to_value(c),
            NodeConfig::CollectInfo(c) => serde_json::to_value(c),
            NodeConfig::Webhook(c) => serde_json::to_value(c),
            NodeConfig::End => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }

    /// Condition ids declared by a decision config; empty for other types.
    pub fn condition_ids(&self) -> Vec<&str> {
        match self {
            NodeConfig::Decision(c) => c.conditions.iter().map(|c| c.id.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Evaluate the per-type configuration constraints.
    ///
    /// Returns `(rule, message)` pairs; an empty result means the config is
    /// well-formed. Connection-related checks live in the validator, not
    /// here.
    pub fn constraint_violations(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        match self {
            NodeConfig::Start(c) => {
                if c.greeting.trim().is_empty() {
                    out.push(("empty_greeting", "greeting message must not be empty".into()));
                }
            }
            NodeConfig::Say(c) => {
                if c.message.trim().is_empty() {
                    out.push(("empty_message", "message must not be empty".into()));
                }
            }
            NodeConfig::Listen(c) => {
                if c.timeout_secs < LISTEN_TIMEOUT_MIN_SECS
                    || c.timeout_secs > LISTEN_TIMEOUT_MAX_SECS
                {
                    out.push((
                        "timeout_range",
                        format!(
                            "timeout must be between {LISTEN_TIMEOUT_MIN_SECS} and \
                             {LISTEN_TIMEOUT_MAX_SECS} seconds, got {}",
                            c.timeout_secs
                        ),
                    ));
                }
            }
            NodeConfig::Decision(c) => {
                if c.conditions.is_empty() {
                    out.push((
                        "no_conditions",
                        "decision node must declare at least one condition".into(),
                    ));
                }
                for cond in &c.conditions {
                    if cond.id.trim().is_empty() {
                        out.push(("empty_condition_id", "condition id must not be empty".into()));
                    }
                    if cond.name.trim().is_empty() {
                        out.push((
                            "empty_condition_name",
                            format!("condition '{}' must have a non-empty name", cond.id),
                        ));
                    }
                    if cond.value.trim().is_empty() {
                        out.push((
                            "empty_condition_value",
                            format!("condition '{}' must have a non-empty value", cond.id),
                        ));
                    }
                }
            }
            NodeConfig::Action(c) => {
                if c.action_type.trim().is_empty() {
                    out.push(("missing_action_type", "action type must be set".into()));
                } else if c.action_type == ACTION_TYPE_API_CALL {
                    match &c.url {
                        Some(url) if url.validate_url() => {}
                        Some(url) => out.push((
                            "invalid_url",
                            format!("'{url}' is not a valid absolute URL"),
                        )),
                        None => out.push((
                            "missing_url",
                            "api_call actions must configure a URL".into(),
                        )),
                    }
                }
            }
            NodeConfig::Transfer(c) => {
                if c.destination.trim().is_empty() {
                    out.push((
                        "empty_destination",
                        "transfer destination must not be empty".into(),
                    ));
                }
                if c.transfer_type.trim().is_empty() {
                    out.push(("missing_transfer_type", "transfer type must be set".into()));
                }
            }
            NodeConfig::CollectInfo(c) => {
                if c.fields.is_empty() {
                    out.push((
                        "no_fields",
                        "collect_info node must declare at least one field".into(),
                    ));
                }
                for field in &c.fields {
                    if field.name.trim().is_empty() {
                        out.push(("empty_field_name", "field name must not be empty".into()));
                    }
                    if field.prompt.trim().is_empty() {
                        out.push((
                            "empty_field_prompt",
                            format!("field '{}' must have a non-empty prompt", field.name),
                        ));
                    }
                }
            }
            NodeConfig::Webhook(c) => {
                if !c.url.validate_url() {
                    out.push((
                        "invalid_url",
                        format!("'{}' is not a valid absolute URL", c.url),
                    ));
                }
                if !WEBHOOK_METHODS.contains(&c.method.as_str()) {
                    out.push((
                        "invalid_method",
                        format!("'{}' is not a supported HTTP method", c.method),
                    ));
                }
            }
            NodeConfig::End => {}
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- Slot tables ----------------------------------------------------------

    #[test]
    fn start_and_say_require_next() {
        assert_eq!(NodeType::Start.required_slots(), &["next"]);
        assert_eq!(NodeType::Say.required_slots(), &["next"]);
    }

    #[test]
    fn end_has_no_slots() {
        assert!(NodeType::End.required_slots().is_empty());
        assert!(NodeType::End.optional_slots().is_empty());
        assert_eq!(NodeType::End.primary_slot(), None);
    }

    #[test]
    fn primary_slot_per_type() {
        assert_eq!(NodeType::Start.primary_slot(), Some("next"));
        assert_eq!(NodeType::Listen.primary_slot(), Some("success"));
        assert_eq!(NodeType::Transfer.primary_slot(), Some("completed"));
        assert_eq!(NodeType::Decision.primary_slot(), Some("default"));
        assert_eq!(NodeType::Webhook.primary_slot(), Some("success"));
    }

    #[test]
    fn listen_optional_slots_include_no_input() {
        assert!(NodeType::Listen.optional_slots().contains(&"noInput"));
    }

    #[test]
    fn node_type_round_trips_through_serde() {
        for ty in [
            NodeType::Start,
            NodeType::Say,
            NodeType::Listen,
            NodeType::Decision,
            NodeType::Action,
            NodeType::Transfer,
            NodeType::CollectInfo,
            NodeType::Webhook,
            NodeType::End,
        ] {
            let s = serde_json::to_string(&ty).unwrap();
            assert_eq!(s, format!("\"{}\"", ty.as_str()));
            let back: NodeType = serde_json::from_str(&s).unwrap();
            assert_eq!(back, ty);
        }
    }

    // -- Config parsing -------------------------------------------------------

    #[test]
    fn parse_say_config() {
        let config = NodeConfig::from_value(NodeType::Say, json!({"message": "hi"})).unwrap();
        assert_eq!(config, NodeConfig::Say(SayConfig { message: "hi".into() }));
    }

    #[test]
    fn parse_listen_config_defaults_timeout() {
        let config = NodeConfig::from_value(NodeType::Listen, json!({})).unwrap();
        assert_eq!(config, NodeConfig::Listen(ListenConfig { timeout_secs: 10 }));
    }

    #[test]
    fn parse_end_config_ignores_payload() {
        let config = NodeConfig::from_value(NodeType::End, json!({"anything": true})).unwrap();
        assert_eq!(config, NodeConfig::End);
    }

    #[test]
    fn webhook_method_defaults_to_post() {
        let config =
            NodeConfig::from_value(NodeType::Webhook, json!({"url": "https://x.test/hook"}))
                .unwrap();
        match config {
            NodeConfig::Webhook(c) => assert_eq!(c.method, "POST"),
            other => panic!("unexpected config: {other:?}"),
        }
    }

    // -- Constraint checks ----------------------------------------------------

    #[test]
    fn empty_greeting_is_violation() {
        let config = NodeConfig::Start(StartConfig { greeting: "  ".into() });
        let violations = config.constraint_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].0, "empty_greeting");
    }

    #[test]
    fn listen_timeout_bounds() {
        for (timeout, ok) in [(4, false), (5, true), (60, true), (61, false)] {
            let config = NodeConfig::Listen(ListenConfig { timeout_secs: timeout });
            assert_eq!(config.constraint_violations().is_empty(), ok, "timeout {timeout}");
        }
    }

    #[test]
    fn decision_requires_conditions() {
        let config = NodeConfig::Decision(DecisionConfig { conditions: vec![] });
        assert_eq!(config.constraint_violations()[0].0, "no_conditions");
    }

    #[test]
    fn decision_condition_fields_must_be_non_empty() {
        let config = NodeConfig::Decision(DecisionConfig {
            conditions: vec![Condition {
                id: "c1".into(),
                name: String::new(),
                value: "yes".into(),
            }],
        });
        let rules: Vec<_> = config
            .constraint_violations()
            .into_iter()
            .map(|(rule, _)| rule)
            .collect();
        assert_eq!(rules, vec!["empty_condition_name"]);
    }

    #[test]
    fn action_api_call_needs_valid_url() {
        let config = NodeConfig::Action(ActionConfig {
            action_type: "api_call".into(),
            url: Some("not a url".into()),
            params: serde_json::Value::Null,
        });
        assert_eq!(config.constraint_violations()[0].0, "invalid_url");

        let config = NodeConfig::Action(ActionConfig {
            action_type: "api_call".into(),
            url: Some("https://api.example.com/v1/call".into()),
            params: serde_json::Value::Null,
        });
        assert!(config.constraint_violations().is_empty());
    }

    #[test]
    fn action_without_url_is_fine_unless_api_call() {
        let config = NodeConfig::Action(ActionConfig {
            action_type: "set_variable".into(),
            url: None,
            params: serde_json::json!({"name": "caller", "value": "x"}),
        });
        assert!(config.constraint_violations().is_empty());
    }

    #[test]
    fn webhook_rejects_relative_url_and_bad_method() {
        let config = NodeConfig::Webhook(WebhookConfig {
            url: "/relative/path".into(),
            method: "FETCH".into(),
        });
        let rules: Vec<_> = config
            .constraint_violations()
            .into_iter()
            .map(|(rule, _)| rule)
            .collect();
        assert_eq!(rules, vec!["invalid_url", "invalid_method"]);
    }

    #[test]
    fn collect_info_requires_fields_with_prompts() {
        let config = NodeConfig::CollectInfo(CollectInfoConfig {
            fields: vec![CollectField {
                name: "phone".into(),
                prompt: String::new(),
                required: true,
            }],
        });
        assert_eq!(config.constraint_violations()[0].0, "empty_field_prompt");
    }

    #[test]
    fn transfer_requires_destination_and_type() {
        let config = NodeConfig::Transfer(TransferConfig::default());
        let rules: Vec<_> = config
            .constraint_violations()
            .into_iter()
            .map(|(rule, _)| rule)
            .collect();
        assert_eq!(rules, vec!["empty_destination", "missing_transfer_type"]);
    }
}
