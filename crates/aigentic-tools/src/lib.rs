//! Tool implementations and the tool catalogue for Aigentic agents

mod function;
mod registry;
mod terminal;
mod typed;

pub use function::FunctionTool;
pub use registry::ToolRegistry;
pub use terminal::{FINISHED_OR_STUCK_TOOL, FinishReason, STUCK_TOOL, TerminalKind, TerminalTool};
pub use typed::TypedTool;

pub use aigentic_core::{Tool, ToolArguments, ToolDescription, ToolError, ToolName};
