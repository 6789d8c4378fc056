//! Agent executor, message log, typed agents and workflows for Aigentic

mod agent;
mod config;
mod executor;
mod listener;
mod log;
mod prompt;
mod schedule;
mod typed;
mod workflow;

pub use agent::{Agent, AgentBuilder, AgentContext, AgentState, AgentStatus, Task};
pub use config::{AgentSpec, ExecutorConfig, TaskSpec};
pub use executor::{AgentExecutor, RunHandle};
pub use listener::{CallbackListener, LoggingListener, MessageListener, create_listener};
pub use log::{MessageLog, Subscription};
pub use prompt::{
    DEFAULT_SYSTEM_PROMPT, DefaultSystemPromptBuilder, PromptContext, StaticSystemPrompt,
    SystemPromptBuilder,
};
pub use schedule::{Schedule, ScheduleType};
pub use typed::{AgentRun, Outcome, TypedAgent};
pub use workflow::{Workflow, WorkflowRun};
