use parking_lot::RwLock;
use std::sync::Arc;

use aigentic_core::{Tool, ToolDescription, ToolError};

/// Insertion-ordered tool catalogue. Names are unique.
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let mut tools = self.tools.write();
        let name = tool.name().as_str();

        if tools.iter().any(|existing| existing.name().as_str() == name) {
            return Err(ToolError::Duplicate(name.to_string()));
        }

        tracing::debug!(tool = %name, "registered tool");
        tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .iter()
            .find(|tool| tool.name().as_str() == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools
            .read()
            .iter()
            .map(|tool| tool.name().to_string())
            .collect()
    }

    pub fn descriptions(&self) -> Vec<ToolDescription> {
        self.tools.read().iter().map(|tool| tool.describe()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FunctionTool, TerminalTool};
    use aigentic_core::{Parameter, ToolArguments};

    fn tool(name: &str) -> Arc<dyn Tool> {
        Arc::new(
            FunctionTool::new(name, vec![Parameter::string("query")], |_args: ToolArguments| async move {
                Ok("ok".to_string())
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_register_and_get() {
        let registry = ToolRegistry::new();
        registry.register(tool("search")).unwrap();

        assert!(registry.contains("search"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = ToolRegistry::new();
        registry.register(tool("search")).unwrap();
        let err = registry.register(tool("search")).unwrap_err();
        assert_eq!(err, ToolError::Duplicate("search".to_string()));
    }

    #[test]
    fn test_descriptions_keep_registration_order() {
        let registry = ToolRegistry::new();
        registry.register(tool("b")).unwrap();
        registry.register(tool("a")).unwrap();
        registry
            .register(Arc::new(TerminalTool::finished_or_stuck(None)))
            .unwrap();

        let names: Vec<_> = registry
            .descriptions()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "finishedOrStuck"]);
    }
}
