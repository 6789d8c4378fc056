//! Core types and traits for the Aigentic agent framework

pub mod arguments;
pub mod error;
pub mod message;
pub mod parameter;
pub mod run;
pub mod traits;

pub use arguments::ToolArguments;
pub use error::{AgentError, Result, SchemaError};
pub use message::{ImageContent, Message, Sender, ToolCall, ToolCallId};
pub use parameter::{Parameter, PrimitiveType, PrimitiveValue};
pub use run::{ModelRequestInfo, Run, RunResult};
pub use traits::model::{Authentication, Model, ModelError, ModelResponse, TokenUsage};
pub use traits::tool::{Tool, ToolDescription, ToolError, ToolName};
