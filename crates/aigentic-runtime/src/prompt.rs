use minijinja::Environment;
use serde::Serialize;

use aigentic_core::{AgentError, Result};
use aigentic_tools::{FINISHED_OR_STUCK_TOOL, STUCK_TOOL};

use crate::agent::Task;

/// Values available to a system prompt template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub agent_id: String,
    pub task: Task,
    pub tools: Vec<String>,
    pub has_response: bool,
    pub finished_tool: &'static str,
    pub stuck_tool: &'static str,
}

impl PromptContext {
    pub fn new(agent_id: impl Into<String>, task: Task) -> Self {
        Self {
            agent_id: agent_id.into(),
            task,
            tools: Vec::new(),
            has_response: false,
            finished_tool: FINISHED_OR_STUCK_TOOL,
            stuck_tool: STUCK_TOOL,
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_response(mut self, has_response: bool) -> Self {
        self.has_response = has_response;
        self
    }
}

pub trait SystemPromptBuilder: Send + Sync {
    fn build(&self, context: &PromptContext) -> Result<String>;
}

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an autonomous agent working on the following task.

Task: {{ task.description }}
{%- if task.instructions %}

Instructions:
{%- for instruction in task.instructions %}
- {{ instruction }}
{%- endfor %}
{%- endif %}
{%- if tools %}

Available tools: {{ tools | join(", ") }}
{%- endif %}

Always respond by calling one or more tools. When every part of the task is done, call `{{ finished_tool }}` with finishReason "FinishedAllTasks" and a short description of the result
{%- if has_response %}, and put the structured result in `response`{% endif %}.
If you cannot make progress, call `{{ finished_tool }}` with finishReason "ImStuck" or call `{{ stuck_tool }}`, explaining why in the description."#;

/// Renders a minijinja template against a [`PromptContext`].
pub struct DefaultSystemPromptBuilder {
    env: Environment<'static>,
    template: String,
}

impl DefaultSystemPromptBuilder {
    pub fn new() -> Self {
        Self::with_template(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            env: Environment::new(),
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for DefaultSystemPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPromptBuilder for DefaultSystemPromptBuilder {
    fn build(&self, context: &PromptContext) -> Result<String> {
        let tmpl = self
            .env
            .template_from_str(&self.template)
            .map_err(|e| AgentError::Template(format!("Failed to parse template: {}", e)))?;

        tmpl.render(context)
            .map_err(|e| AgentError::Template(format!("Failed to render template: {}", e)))
    }
}

/// A fixed prompt that ignores the context.
pub struct StaticSystemPrompt(pub String);

impl SystemPromptBuilder for StaticSystemPrompt {
    fn build(&self, _context: &PromptContext) -> Result<String> {
        Ok(self.0.clone())
    }
}
