use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use aigentic_core::{ToolCall, ToolCallId, ToolDescription};

use crate::handler::ToolPermissionHandler;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    #[default]
    Allow,
    /// Hold the call until it is granted through [`PolicyHandler::grant`].
    Ask,
}

/// Per-tool permission rules, loadable from YAML.
///
/// ```yaml
/// default_action: allow
/// tools:
///   deleteFile: ask
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PermissionPolicy {
    #[serde(default)]
    pub default_action: PermissionAction,

    #[serde(default)]
    pub tools: HashMap<String, PermissionAction>,
}

impl PermissionPolicy {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn ask_all() -> Self {
        Self {
            default_action: PermissionAction::Ask,
            tools: HashMap::new(),
        }
    }

    pub fn with_tool(mut self, name: impl Into<String>, action: PermissionAction) -> Self {
        self.tools.insert(name.into(), action);
        self
    }

    pub fn action_for(&self, tool_name: &str) -> PermissionAction {
        self.tools
            .get(tool_name)
            .copied()
            .unwrap_or(self.default_action)
    }
}

/// A tool call waiting for a human decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingApproval {
    pub tool: ToolDescription,
    pub call: ToolCall,
}

/// Applies a [`PermissionPolicy`]. Calls whose tool is marked `ask` are parked in a pending
/// queue until someone grants them by call id.
pub struct PolicyHandler {
    policy: PermissionPolicy,
    pending: RwLock<Vec<PendingApproval>>,
    granted: RwLock<HashSet<ToolCallId>>,
}

impl PolicyHandler {
    pub fn new(policy: PermissionPolicy) -> Self {
        Self {
            policy,
            pending: RwLock::new(Vec::new()),
            granted: RwLock::new(HashSet::new()),
        }
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    pub fn pending(&self) -> Vec<PendingApproval> {
        self.pending.read().clone()
    }

    /// Grants a pending call. Returns false when no such call is waiting.
    pub fn grant(&self, call_id: &ToolCallId) -> bool {
        let mut pending = self.pending.write();
        let before = pending.len();
        pending.retain(|p| &p.call.id != call_id);
        if pending.len() == before {
            return false;
        }
        tracing::info!(call_id = %call_id, "tool call approved");
        self.granted.write().insert(call_id.clone());
        true
    }

    /// Drops a pending call without granting it; the run keeps waiting until aborted.
    pub fn dismiss(&self, call_id: &ToolCallId) -> bool {
        let mut pending = self.pending.write();
        let before = pending.len();
        pending.retain(|p| &p.call.id != call_id);
        pending.len() != before
    }
}

#[async_trait]
impl ToolPermissionHandler for PolicyHandler {
    async fn has_permission(&self, tool: &ToolDescription, call: &ToolCall) -> bool {
        match self.policy.action_for(tool.name.as_str()) {
            PermissionAction::Allow => true,
            PermissionAction::Ask => {
                if self.granted.write().remove(&call.id) {
                    return true;
                }
                let mut pending = self.pending.write();
                if !pending.iter().any(|p| p.call.id == call.id) {
                    tracing::warn!(tool = %tool.name, call_id = %call.id, "tool call awaiting approval");
                    pending.push(PendingApproval {
                        tool: tool.clone(),
                        call: call.clone(),
                    });
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigentic_core::{Parameter, ToolName};
    use serde_json::json;

    fn description(name: &str) -> ToolDescription {
        ToolDescription {
            name: ToolName::new(name).unwrap(),
            description: None,
            parameters: vec![Parameter::string("path")],
        }
    }

    #[test]
    fn test_policy_from_yaml() {
        let yaml = r#"
default_action: allow
tools:
  deleteFile: ask
"#;
        let policy: PermissionPolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.action_for("deleteFile"), PermissionAction::Ask);
        assert_eq!(policy.action_for("readFile"), PermissionAction::Allow);
    }

    #[test]
    fn test_policy_defaults() {
        let policy: PermissionPolicy = serde_yaml::from_str("{}").unwrap();
        assert_eq!(policy, PermissionPolicy::allow_all());
    }

    #[tokio::test]
    async fn test_allowed_tool_passes_immediately() {
        let handler = PolicyHandler::new(
            PermissionPolicy::allow_all().with_tool("deleteFile", PermissionAction::Ask),
        );
        let call = ToolCall::with_value("readFile", &json!({ "path": "a.txt" }));
        assert!(handler.has_permission(&description("readFile"), &call).await);
        assert!(handler.pending().is_empty());
    }

    #[tokio::test]
    async fn test_ask_tool_waits_for_grant() {
        let handler = PolicyHandler::new(PermissionPolicy::ask_all());
        let tool = description("deleteFile");
        let call = ToolCall::with_value("deleteFile", &json!({ "path": "a.txt" }));

        assert!(!handler.has_permission(&tool, &call).await);
        assert!(!handler.has_permission(&tool, &call).await);
        assert_eq!(handler.pending().len(), 1);

        assert!(handler.grant(&call.id));
        assert!(handler.pending().is_empty());
        assert!(handler.has_permission(&tool, &call).await);
    }

    #[tokio::test]
    async fn test_grant_unknown_call() {
        let handler = PolicyHandler::new(PermissionPolicy::ask_all());
        assert!(!handler.grant(&ToolCallId::new("missing")));
    }

    #[tokio::test]
    async fn test_dismiss_removes_without_granting() {
        let handler = PolicyHandler::new(PermissionPolicy::ask_all());
        let tool = description("deleteFile");
        let call = ToolCall::with_value("deleteFile", &json!({}));

        assert!(!handler.has_permission(&tool, &call).await);
        assert!(handler.dismiss(&call.id));
        assert!(!handler.grant(&call.id));
    }
}
