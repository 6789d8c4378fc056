use async_trait::async_trait;
use std::sync::Arc;

use aigentic_core::{ToolCall, ToolDescription};

/// Gate consulted before every non-terminal tool call.
///
/// The executor polls `has_permission` until it returns `true`. A handler that never grants
/// permission makes the run wait indefinitely; the wait ends only when the run is aborted.
/// One handler instance is shared by every agent an executor runs, so implementations must be
/// safe to call concurrently.
#[async_trait]
pub trait ToolPermissionHandler: Send + Sync {
    async fn has_permission(&self, tool: &ToolDescription, call: &ToolCall) -> bool;
}

pub struct AlwaysAllowHandler;

impl AlwaysAllowHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AlwaysAllowHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolPermissionHandler for AlwaysAllowHandler {
    async fn has_permission(&self, _tool: &ToolDescription, _call: &ToolCall) -> bool {
        true
    }
}

// Useful for exercising the wait/abort path
pub struct DenyAllHandler;

impl DenyAllHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DenyAllHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolPermissionHandler for DenyAllHandler {
    async fn has_permission(&self, tool: &ToolDescription, call: &ToolCall) -> bool {
        tracing::trace!(tool = %tool.name, call_id = %call.id, "permission denied");
        false
    }
}

pub struct CallbackHandler<F>
where
    F: Fn(&ToolDescription, &ToolCall) -> bool + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&ToolDescription, &ToolCall) -> bool + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> ToolPermissionHandler for CallbackHandler<F>
where
    F: Fn(&ToolDescription, &ToolCall) -> bool + Send + Sync,
{
    async fn has_permission(&self, tool: &ToolDescription, call: &ToolCall) -> bool {
        (self.callback)(tool, call)
    }
}

pub fn create_handler<F>(callback: F) -> Arc<dyn ToolPermissionHandler>
where
    F: Fn(&ToolDescription, &ToolCall) -> bool + Send + Sync + 'static,
{
    Arc::new(CallbackHandler::new(callback))
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
            parameters: vec![Parameter::integer("count")],
        }
    }

    fn call(name: &str) -> ToolCall {
        ToolCall::with_value(name, &json!({ "count": 1 }))
    }

    #[tokio::test]
    async fn test_always_allow() {
        let handler = AlwaysAllowHandler::new();
        assert!(handler.has_permission(&description("search"), &call("search")).await);
    }

    #[tokio::test]
    async fn test_deny_all() {
        let handler = DenyAllHandler::new();
        assert!(!handler.has_permission(&description("search"), &call("search")).await);
    }

    #[tokio::test]
    async fn test_callback_handler_by_name() {
        let handler = create_handler(|tool, _call| tool.name.as_str() != "deleteFile");
        assert!(handler.has_permission(&description("search"), &call("search")).await);
        assert!(
            !handler
                .has_permission(&description("deleteFile"), &call("deleteFile"))
                .await
        );
    }
}
