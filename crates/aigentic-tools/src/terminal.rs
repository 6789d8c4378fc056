//! Internal tools that end a run instead of producing another model turn

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aigentic_core::{Parameter, RunResult, Tool, ToolArguments, ToolError, ToolName};

pub const FINISHED_OR_STUCK_TOOL: &str = "finishedOrStuck";
pub const STUCK_TOOL: &str = "stuck";

const FINISH_REASON: &str = "finishReason";
const DESCRIPTION: &str = "description";
const RESPONSE: &str = "response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    FinishedAllTasks,
    ImStuck,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::FinishedAllTasks => "FinishedAllTasks",
            FinishReason::ImStuck => "ImStuck",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    FinishedOrStuck,
    Stuck,
}

#[derive(Debug, Clone)]
pub struct TerminalTool {
    kind: TerminalKind,
    name: ToolName,
    description: String,
    parameters: Vec<Parameter>,
}

impl TerminalTool {
    /// The tool the model calls when done. `response` is the agent's structured response
    /// schema, if it declares one; it is optional because a stuck model has nothing to return.
    pub fn finished_or_stuck(response: Option<Parameter>) -> Self {
        let mut parameters = vec![
            finish_reason_parameter(),
            Parameter::string(DESCRIPTION)
                .with_description("Summary of what was done, or why no progress is possible"),
        ];
        if let Some(response) = response {
            parameters.push(
                response
                    .with_name(RESPONSE)
                    .optional()
                    .with_description("Structured result of the task"),
            );
        }
        Self {
            kind: TerminalKind::FinishedOrStuck,
            name: ToolName::new_unchecked(FINISHED_OR_STUCK_TOOL),
            description: "Call this when all tasks are finished, or when you are stuck and cannot continue"
                .to_string(),
            parameters,
        }
    }

    pub fn stuck() -> Self {
        Self {
            kind: TerminalKind::Stuck,
            name: ToolName::new_unchecked(STUCK_TOOL),
            description: "Call this when you cannot make any further progress".to_string(),
            parameters: vec![
                finish_reason_parameter().optional(),
                Parameter::string(DESCRIPTION).with_description("Why no progress is possible"),
            ],
        }
    }

    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    pub fn is_terminal_name(name: &str) -> bool {
        name == FINISHED_OR_STUCK_TOOL || name == STUCK_TOOL
    }

    /// Interprets the call payload as a run outcome.
    pub fn outcome(&self, arguments: &ToolArguments) -> Result<RunResult, ToolError> {
        arguments.resolve_all(&self.parameters)?;
        let description: String = arguments.required(DESCRIPTION)?;
        let reason: Option<FinishReason> = arguments.optional(FINISH_REASON)?;

        let result = match (self.kind, reason) {
            (TerminalKind::Stuck, _) | (_, Some(FinishReason::ImStuck)) => {
                RunResult::stuck(description)
            }
            (TerminalKind::FinishedOrStuck, _) => {
                RunResult::finished(description, arguments.get(RESPONSE).cloned())
            }
        };
        Ok(result)
    }
}

#[async_trait]
impl Tool for TerminalTool {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn handle(&self, arguments: ToolArguments) -> Result<String, ToolError> {
        let outcome = self.outcome(&arguments)?;
        Ok(serde_json::to_string(&outcome)?)
    }
}

fn finish_reason_parameter() -> Parameter {
    Parameter::string_enum(
        FINISH_REASON,
        [
            FinishReason::FinishedAllTasks.as_str(),
            FinishReason::ImStuck.as_str(),
        ],
    )
}
