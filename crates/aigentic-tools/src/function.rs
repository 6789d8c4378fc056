use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use aigentic_core::{Parameter, Tool, ToolArguments, ToolError, ToolName};

type Handler = Arc<dyn Fn(ToolArguments) -> BoxFuture<'static, Result<String, ToolError>> + Send + Sync>;

/// Tool backed by an async closure over the raw argument map.
#[derive(Clone)]
pub struct FunctionTool {
    name: ToolName,
    description: Option<String>,
    parameters: Vec<Parameter>,
    handler: Handler,
}

impl FunctionTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        handler: F,
    ) -> Result<Self, ToolError>
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        Ok(Self {
            name: ToolName::new(name)?,
            description: None,
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn handle(&self, arguments: ToolArguments) -> Result<String, ToolError> {
        arguments.resolve_all(&self.parameters)?;
        (self.handler)(arguments).await
    }
}
