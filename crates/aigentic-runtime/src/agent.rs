use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use aigentic_core::{
    AgentError, ImageContent, Message, Model, Parameter, Result, RunResult, Sender, Tool,
    ToolDescription,
};
use aigentic_schema::parameter_for;
use aigentic_tools::{FINISHED_OR_STUCK_TOOL, STUCK_TOOL, TerminalTool, ToolRegistry};

use crate::config::AgentSpec;
use crate::log::MessageLog;
use crate::prompt::{DefaultSystemPromptBuilder, PromptContext, SystemPromptBuilder};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            instructions: Vec::new(),
        }
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }
}

/// Extra material placed after the system prompt, in configured order.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentContext {
    Text(String),
    Image(ImageContent),
}

impl AgentContext {
    pub fn to_message(&self) -> Message {
        match self {
            AgentContext::Text(text) => Message::text(Sender::Aigentic, text.clone()),
            AgentContext::Image(image) => Message::image(Sender::Aigentic, image.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    WaitingToStart,
    Running,
    ExecutingTool,
    WaitingOnApproval,
    Completed,
    Stuck,
    Failed,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentState::Completed | AgentState::Stuck | AgentState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub state: AgentState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for AgentStatus {
    fn default() -> Self {
        Self {
            state: AgentState::WaitingToStart,
            started_at: None,
            finished_at: None,
        }
    }
}

/// A configured task, model and tool set. Cheap to clone; clones share status and log.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

struct AgentInner {
    id: String,
    task: Task,
    model: Arc<dyn Model>,
    tools: ToolRegistry,
    system_tools: ToolRegistry,
    contexts: Vec<AgentContext>,
    response: Option<Parameter>,
    system_prompt_builder: Arc<dyn SystemPromptBuilder>,
    status: RwLock<AgentStatus>,
    log: RwLock<Option<Arc<MessageLog>>>,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn task(&self) -> &Task {
        &self.inner.task
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.inner.model
    }

    pub fn contexts(&self) -> &[AgentContext] {
        &self.inner.contexts
    }

    pub fn response(&self) -> Option<&Parameter> {
        self.inner.response.as_ref()
    }

    /// Caller-supplied tools. Terminal tools are not included.
    pub fn tools(&self) -> &ToolRegistry {
        &self.inner.tools
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.inner.tools.get(name)
    }

    /// Everything the model may call: visible tools followed by the terminal tools.
    pub fn tool_catalogue(&self) -> Vec<ToolDescription> {
        let mut catalogue = self.inner.tools.descriptions();
        catalogue.extend(self.inner.system_tools.descriptions());
        catalogue
    }

    pub(crate) fn terminal_tool(&self, name: &str) -> Option<TerminalTool> {
        match name {
            FINISHED_OR_STUCK_TOOL => Some(TerminalTool::finished_or_stuck(
                self.inner.response.clone(),
            )),
            STUCK_TOOL => Some(TerminalTool::stuck()),
            _ => None,
        }
    }

    pub fn system_prompt(&self) -> Result<String> {
        let context = PromptContext::new(self.id(), self.task().clone())
            .with_tools(self.inner.tools.names())
            .with_response(self.inner.response.is_some());
        self.inner.system_prompt_builder.build(&context)
    }

    pub fn status(&self) -> AgentStatus {
        self.inner.status.read().clone()
    }

    /// Live log of the most recent run, if the agent has been started.
    pub fn messages(&self) -> Option<Arc<MessageLog>> {
        self.inner.log.read().clone()
    }

    pub(crate) fn begin_run(&self, log: Arc<MessageLog>) {
        *self.inner.log.write() = Some(log);
        *self.inner.status.write() = AgentStatus {
            state: AgentState::Running,
            started_at: Some(Utc::now()),
            finished_at: None,
        };
    }

    pub(crate) fn set_state(&self, state: AgentState) {
        self.inner.status.write().state = state;
    }

    pub(crate) fn finish_run(&self, result: Option<&RunResult>) {
        let state = match result {
            Some(RunResult::Finished { .. }) => AgentState::Completed,
            Some(RunResult::Stuck { .. }) => AgentState::Stuck,
            Some(RunResult::Fatal { .. }) | None => AgentState::Failed,
        };
        let mut status = self.inner.status.write();
        status.state = state;
        status.finished_at = Some(Utc::now());
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.inner.id)
            .field("model", &self.inner.model.model_id())
            .field("task", &self.inner.task)
            .field("tools", &self.inner.tools)
            .field("status", &self.status())
            .finish()
    }
}

pub struct AgentBuilder {
    id: Option<String>,
    task: Task,
    model: Option<Arc<dyn Model>>,
    tools: Vec<Arc<dyn Tool>>,
    contexts: Vec<AgentContext>,
    response: Option<Parameter>,
    system_prompt_builder: Option<Arc<dyn SystemPromptBuilder>>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            task: Task::default(),
            model: None,
            tools: Vec::new(),
            contexts: Vec::new(),
            response: None,
            system_prompt_builder: None,
        }
    }

    pub fn from_spec(spec: AgentSpec) -> Self {
        let mut builder = Self::new().id(spec.name).task(Task {
            description: spec.task.description,
            instructions: spec.task.instructions,
        });
        builder.contexts = spec.contexts.into_iter().map(AgentContext::Text).collect();
        builder
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        Ok(Self::from_spec(AgentSpec::from_yaml_str(yaml_content)?))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_spec(AgentSpec::from_file(path)?))
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.task.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.task.instructions.push(instruction.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn context(mut self, context: AgentContext) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn text_context(self, text: impl Into<String>) -> Self {
        self.context(AgentContext::Text(text.into()))
    }

    pub fn image_context(self, image: ImageContent) -> Self {
        self.context(AgentContext::Image(image))
    }

    /// Declares the structured response the model returns through the terminal tool.
    pub fn response(mut self, response: Parameter) -> Self {
        self.response = Some(response);
        self
    }

    pub fn response_type<T: JsonSchema>(self) -> Result<Self> {
        Ok(self.response(parameter_for::<T>("response")?))
    }

    pub fn system_prompt_builder(mut self, builder: Arc<dyn SystemPromptBuilder>) -> Self {
        self.system_prompt_builder = Some(builder);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let model = self
            .model
            .ok_or_else(|| AgentError::Config("Agent requires a model".to_string()))?;

        if self.task.description.trim().is_empty() {
            return Err(AgentError::Config(
                "Agent task description cannot be empty".to_string(),
            ));
        }

        if let Some(response) = &self.response {
            response.validate()?;
        }

        let tools = ToolRegistry::new();
        for tool in self.tools {
            if TerminalTool::is_terminal_name(tool.name().as_str()) {
                return Err(AgentError::Config(format!(
                    "Tool name '{}' is reserved",
                    tool.name()
                )));
            }
            for parameter in tool.parameters() {
                parameter.validate()?;
            }
            tools.register(tool)?;
        }

        let system_tools = ToolRegistry::new();
        system_tools.register(Arc::new(TerminalTool::finished_or_stuck(
            self.response.clone(),
        )))?;
        system_tools.register(Arc::new(TerminalTool::stuck()))?;

        let id = self
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        tracing::debug!(agent_id = %id, tools = tools.len(), "agent built");

        Ok(Agent {
            inner: Arc::new(AgentInner {
                id,
                task: self.task,
                model,
                tools,
                system_tools,
                contexts: self.contexts,
                response: self.response,
                system_prompt_builder: self
                    .system_prompt_builder
                    .unwrap_or_else(|| Arc::new(DefaultSystemPromptBuilder::new())),
                status: RwLock::new(AgentStatus::default()),
                log: RwLock::new(None),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
