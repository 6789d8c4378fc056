//! The agent execution loop: send, interpret, dispatch, resume.

use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use aigentic_core::{
    AgentError, Message, ModelError, ModelRequestInfo, Result, Run, RunResult, ToolArguments,
    ToolCall, ToolDescription, ToolError,
};
use aigentic_hitl::{AlwaysAllowHandler, ToolPermissionHandler};

use crate::agent::{Agent, AgentState};
use crate::config::{AgentSpec, ExecutorConfig};
use crate::listener::MessageListener;
use crate::log::MessageLog;
use crate::schedule::{Schedule, ScheduleType};

/// Runs agents to completion.
///
/// Cloning is cheap; clones share the permission handler and listeners.
#[derive(Clone)]
pub struct AgentExecutor {
    config: ExecutorConfig,
    permission_handler: Arc<dyn ToolPermissionHandler>,
    listeners: Vec<Arc<dyn MessageListener>>,
}

impl AgentExecutor {
    pub fn new() -> Self {
        Self {
            config: ExecutorConfig::default(),
            permission_handler: Arc::new(AlwaysAllowHandler::new()),
            listeners: Vec::new(),
        }
    }

    /// Executor configured by the `executor` block of an agent definition.
    pub fn from_spec(spec: &AgentSpec) -> Self {
        Self::new().with_config(spec.executor.clone())
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// A handler that never grants permission stalls the run until it is aborted.
    pub fn with_permission_handler(mut self, handler: Arc<dyn ToolPermissionHandler>) -> Self {
        self.permission_handler = handler;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn MessageListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn run(&self, agent: &Agent) -> Run {
        self.run_with_input(agent, Vec::new()).await
    }

    /// Runs `agent` with `input` appended after its context messages.
    pub async fn run_with_input(&self, agent: &Agent, input: Vec<Message>) -> Run {
        let started_at = Utc::now();
        let log = Arc::new(MessageLog::new(self.config.message_log_capacity));
        agent.begin_run(log.clone());
        self.attach_listeners(agent.id(), &log);

        info!(
            agent_id = agent.id(),
            model = agent.model().model_id(),
            "agent run started"
        );

        let mut recorder = RunRecorder::new(agent, log);
        let result = match self.drive(agent, input, &mut recorder).await {
            Ok(result) => result,
            Err(err) => {
                let message = fatal_message(&err);
                warn!(agent_id = agent.id(), error = %message, "agent run failed");
                RunResult::fatal(message)
            }
        };
        recorder.complete(&result);

        let run = Run {
            agent_id: agent.id().to_string(),
            started_at,
            finished_at: Utc::now(),
            messages: std::mem::take(&mut recorder.messages),
            model_requests: std::mem::take(&mut recorder.model_requests),
            result,
        };
        info!(
            agent_id = agent.id(),
            model_requests = run.model_requests.len(),
            input_tokens = run.total_input_tokens(),
            output_tokens = run.total_output_tokens(),
            outcome = result_kind(&run.result),
            "agent run finished"
        );
        run
    }

    /// Spawns the run on its own task.
    pub fn start(&self, agent: &Agent) -> RunHandle {
        let executor = self.clone();
        let agent = agent.clone();
        let agent_id = agent.id().to_string();
        let task = tokio::spawn(async move { executor.run(&agent).await });
        RunHandle { agent_id, task }
    }

    /// Runs every agent of the schedule concurrently. Results are in schedule order.
    pub async fn run_schedule(&self, schedule: &Schedule) -> Vec<Result<Run>> {
        match schedule.schedule_type() {
            ScheduleType::Single => {
                let handles: Vec<_> = schedule.agents().iter().map(|a| self.start(a)).collect();
                join_all(handles).await
            }
        }
    }

    async fn drive(
        &self,
        agent: &Agent,
        input: Vec<Message>,
        recorder: &mut RunRecorder<'_>,
    ) -> Result<RunResult> {
        recorder.push(Message::system_prompt(agent.system_prompt()?));
        for context in agent.contexts() {
            recorder.push(context.to_message());
        }
        for message in input {
            recorder.push(message);
        }

        let catalogue = agent.tool_catalogue();
        loop {
            if let Some(max) = self.config.max_model_requests {
                if recorder.model_requests.len() >= max as usize {
                    return Err(AgentError::Other(format!(
                        "Exceeded maximum of {} model requests",
                        max
                    )));
                }
            }

            let tool_calls = self.request(agent, &catalogue, recorder).await?;
            if tool_calls.is_empty() {
                return Err(AgentError::UnexpectedMessage(
                    "an empty tool call batch".to_string(),
                ));
            }

            // Every call in the batch runs; the first terminal outcome ends the run afterwards.
            let mut outcome: Option<RunResult> = None;
            for call in &tool_calls {
                if let Some(terminal) = agent.terminal_tool(&call.name) {
                    let arguments = ToolArguments::parse(&call.arguments)?;
                    let result = terminal.outcome(&arguments)?;
                    debug!(agent_id = agent.id(), tool = %call.name, call_id = %call.id, "terminal tool called");
                    outcome.get_or_insert(result);
                    continue;
                }

                let content = self.execute(agent, call).await?;
                recorder.push(Message::tool_result(call, content));
            }

            if let Some(result) = outcome {
                return Ok(result);
            }
        }
    }

    async fn request(
        &self,
        agent: &Agent,
        catalogue: &[ToolDescription],
        recorder: &mut RunRecorder<'_>,
    ) -> Result<Vec<ToolCall>> {
        let model = agent.model();
        let started_at = Utc::now();
        debug!(
            agent_id = agent.id(),
            messages = recorder.messages.len(),
            tools = catalogue.len(),
            "sending model request"
        );

        let response = model.send_request(&recorder.messages, catalogue).await?;

        let usage = response.usage.unwrap_or_default();
        recorder.model_requests.push(ModelRequestInfo {
            model_id: model.model_id().to_string(),
            started_at,
            finished_at: Utc::now(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        });

        let calls = match &response.message {
            Message::ToolCalls { tool_calls, .. } => tool_calls.clone(),
            other => return Err(AgentError::UnexpectedMessage(other.kind().to_string())),
        };
        debug!(agent_id = agent.id(), calls = calls.len(), "model requested tool calls");
        recorder.push(response.message);
        Ok(calls)
    }

    async fn execute(&self, agent: &Agent, call: &ToolCall) -> Result<String> {
        let tool = agent
            .tool(&call.name)
            .ok_or_else(|| ToolError::NotRegistered(call.name.clone()))?;

        self.await_permission(agent, &tool.describe(), call).await;

        let arguments = ToolArguments::parse(&call.arguments)?;
        agent.set_state(AgentState::ExecutingTool);
        debug!(agent_id = agent.id(), tool = %call.name, call_id = %call.id, "executing tool");
        let result = tool.handle(arguments).await;
        agent.set_state(AgentState::Running);

        Ok(result?)
    }

    async fn await_permission(&self, agent: &Agent, tool: &ToolDescription, call: &ToolCall) {
        if self.permission_handler.has_permission(tool, call).await {
            return;
        }

        agent.set_state(AgentState::WaitingOnApproval);
        warn!(
            agent_id = agent.id(),
            tool = %call.name,
            call_id = %call.id,
            "waiting for tool permission"
        );

        let interval = self.config.poll_interval();
        loop {
            tokio::time::sleep(interval).await;
            if self.permission_handler.has_permission(tool, call).await {
                break;
            }
        }

        debug!(agent_id = agent.id(), tool = %call.name, call_id = %call.id, "tool permission granted");
        agent.set_state(AgentState::Running);
    }

    fn attach_listeners(&self, agent_id: &str, log: &MessageLog) {
        for listener in &self.listeners {
            let listener = listener.clone();
            let mut subscription = log.subscribe();
            let id = agent_id.to_string();
            let task = tokio::spawn(async move {
                while let Some(message) = subscription.recv().await {
                    listener.on_message(&id, &message).await;
                }
            });

            let id = agent_id.to_string();
            tokio::spawn(async move {
                if let Err(err) = task.await {
                    if err.is_panic() {
                        warn!(agent_id = %id, "message listener panicked");
                    }
                }
            });
        }
    }
}

impl Default for AgentExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the run transcript and mirrors it into the live log.
///
/// Dropping it before `complete` means the run was aborted; the agent is marked failed and
/// the log closed so subscribers terminate.
struct RunRecorder<'a> {
    agent: &'a Agent,
    log: Arc<MessageLog>,
    messages: Vec<Message>,
    model_requests: Vec<ModelRequestInfo>,
    completed: bool,
}

impl<'a> RunRecorder<'a> {
    fn new(agent: &'a Agent, log: Arc<MessageLog>) -> Self {
        Self {
            agent,
            log,
            messages: Vec::new(),
            model_requests: Vec::new(),
            completed: false,
        }
    }

    fn push(&mut self, message: Message) {
        self.log.push(message.clone());
        self.messages.push(message);
    }

    fn complete(&mut self, result: &RunResult) {
        self.completed = true;
        self.agent.finish_run(Some(result));
        self.log.close();
    }
}

impl Drop for RunRecorder<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(agent_id = self.agent.id(), "agent run aborted");
            self.agent.finish_run(None);
            self.log.close();
        }
    }
}

/// Handle to a spawned run. Awaiting it yields the `Run`, or `AgentError::Cancelled` after
/// [`RunHandle::abort`].
pub struct RunHandle {
    agent_id: String,
    task: JoinHandle<Run>,
}

impl RunHandle {
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn abort(&self) {
        debug!(agent_id = %self.agent_id, "aborting agent run");
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for RunHandle {
    type Output = Result<Run>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(run) => Ok(run),
            Err(err) if err.is_cancelled() => Err(AgentError::Cancelled),
            Err(err) => Err(AgentError::Other(format!("Agent run panicked: {}", err))),
        })
    }
}

fn fatal_message(err: &AgentError) -> String {
    match err {
        AgentError::Model(ModelError::Api { message, .. }) => message.clone(),
        other => other.to_string(),
    }
}

fn result_kind(result: &RunResult) -> &'static str {
    match result {
        RunResult::Finished { .. } => "finished",
        RunResult::Stuck { .. } => "stuck",
        RunResult::Fatal { .. } => "fatal",
    }
}
