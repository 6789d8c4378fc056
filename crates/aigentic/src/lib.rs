//! Aigentic: declare tool-using LLM agents and run them to completion

pub mod agent {
    pub use aigentic_runtime::{
        Agent, AgentBuilder, AgentContext, AgentState, AgentStatus, DEFAULT_SYSTEM_PROMPT,
        DefaultSystemPromptBuilder, PromptContext, StaticSystemPrompt, SystemPromptBuilder, Task,
    };
}

pub mod config {
    pub use aigentic_runtime::{AgentSpec, ExecutorConfig, TaskSpec};
}

pub mod error {
    pub use aigentic_core::{AgentError, ModelError, Result, SchemaError, ToolError};
}

pub mod executor {
    pub use aigentic_runtime::{AgentExecutor, RunHandle, Schedule, ScheduleType};
}

pub mod hitl {
    pub use aigentic_hitl::{
        AlwaysAllowHandler, CallbackHandler, DenyAllHandler, PendingApproval, PermissionAction,
        PermissionPolicy, PolicyHandler, ToolPermissionHandler, create_handler,
    };
}

pub mod listener {
    pub use aigentic_runtime::{
        CallbackListener, LoggingListener, MessageListener, MessageLog, Subscription,
        create_listener,
    };
}

pub mod message {
    pub use aigentic_core::{ImageContent, Message, Sender, ToolCall, ToolCallId};
}

pub mod model {
    pub use aigentic_core::{Authentication, Model, ModelError, ModelResponse, TokenUsage};
    pub use aigentic_llm::{MockCall, MockModel, finished_call, stuck_call};
}

pub mod run {
    pub use aigentic_core::{ModelRequestInfo, Run, RunResult};
    pub use aigentic_runtime::{AgentRun, Outcome};
}

pub mod schema {
    pub use aigentic_core::parameter::parameters_schema;
    pub use aigentic_core::{Parameter, PrimitiveType, PrimitiveValue};
    pub use aigentic_schema::{
        FieldDescriptor, ParameterMapper, ParameterRegistry, PrimitiveKind, TypeDescriptor,
        TypeIdentity, TypeKind, describe, descriptor_from_schema, parameter_for, parameters_for,
    };
}

pub mod tools {
    pub use aigentic_core::{Tool, ToolArguments, ToolDescription, ToolError, ToolName};
    pub use aigentic_tools::{
        FINISHED_OR_STUCK_TOOL, FinishReason, FunctionTool, STUCK_TOOL, TerminalKind,
        TerminalTool, ToolRegistry, TypedTool,
    };
}

pub mod workflow {
    pub use aigentic_runtime::{TypedAgent, Workflow, WorkflowRun};
}

pub use agent::{Agent, AgentBuilder, AgentContext, AgentState, AgentStatus, Task};
pub use config::{AgentSpec, ExecutorConfig};
pub use error::{AgentError, Result};
pub use executor::{AgentExecutor, RunHandle, Schedule};
pub use hitl::ToolPermissionHandler;
pub use listener::{LoggingListener, MessageListener};
pub use message::{Message, Sender, ToolCall};
pub use model::{Model, ModelResponse};
pub use run::{AgentRun, Outcome, Run, RunResult};
pub use schema::Parameter;
pub use tools::{FunctionTool, Tool, ToolArguments, TypedTool};
pub use workflow::{TypedAgent, Workflow, WorkflowRun};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockModel;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct NewsQuery {
        /// Number of events to fetch
        count: u32,
    }

    #[derive(Debug, Serialize)]
    struct NewsEvent {
        title: String,
    }

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Summary {
        events: Vec<String>,
    }

    #[tokio::test]
    async fn test_typed_tool_and_agent_through_facade() {
        let tool = TypedTool::new("getNewsEvents", |query: NewsQuery| async move {
            Ok((0..query.count)
                .map(|i| NewsEvent {
                    title: format!("Event {}", i),
                })
                .collect::<Vec<_>>())
        })
        .unwrap()
        .with_description("Fetch recent news events");

        let model = MockModel::default();
        model.add_tool_call("getNewsEvents", json!({ "count": 2 }));
        model.add_finished(
            "Summarised two events",
            Some(json!({ "events": ["Event 0", "Event 1"] })),
        );

        let agent: TypedAgent<(), Summary> = TypedAgent::new(
            AgentBuilder::new()
                .id("news")
                .description("Summarise the news")
                .model(Arc::new(model.clone()))
                .tool(Arc::new(tool)),
        )
        .unwrap();

        let result = agent.run(&AgentExecutor::new(), &()).await.unwrap();

        assert_eq!(model.call_count(), 2);
        match &result.run.messages[3] {
            Message::ToolResult { content, .. } => {
                assert_eq!(content, r#"[{"title":"Event 0"},{"title":"Event 1"}]"#);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(
            result.outcome.response(),
            Some(&Summary {
                events: vec!["Event 0".to_string(), "Event 1".to_string()]
            })
        );
    }

    #[test]
    fn test_parameter_schema_for_tool_input() {
        let parameters = schema::parameters_for::<NewsQuery>().unwrap();
        assert_eq!(
            parameters,
            vec![Parameter::integer("count").with_description("Number of events to fetch")]
        );
        assert_eq!(
            schema::parameters_schema(&parameters),
            json!({
                "type": "object",
                "properties": {
                    "count": { "type": "integer", "description": "Number of events to fetch" }
                },
                "required": ["count"]
            })
        );
    }
}
