//! Tool trait for model-callable capabilities

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

use crate::arguments::ToolArguments;
use crate::parameter::{Parameter, parameters_schema};

/// Name under which a tool is exposed to the model.
///
/// Provider APIs reject names containing whitespace, so construction validates that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    pub fn new(name: impl Into<String>) -> Result<Self, ToolError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ToolError::InvalidName("tool name must not be empty".to_string()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ToolError::InvalidName(format!(
                "tool name '{}' must not contain spaces",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Wraps a name the caller knows to be valid, such as a framework constant.
    /// Only debug builds check it.
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(
            !name.is_empty() && !name.chars().any(char::is_whitespace),
            "invalid tool name '{}'",
            name
        );
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ToolName {
    type Error = ToolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ToolName::new(value)
    }
}

impl TryFrom<&str> for ToolName {
    type Error = ToolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ToolName::new(value)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

impl Borrow<str> for ToolName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the model sees of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: ToolName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl ToolDescription {
    pub fn input_schema(&self) -> Value {
        parameters_schema(&self.parameters)
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &ToolName;

    fn description(&self) -> Option<&str> {
        None
    }

    fn parameters(&self) -> &[Parameter];

    async fn handle(&self, arguments: ToolArguments) -> Result<String, ToolError>;

    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: self.name().clone(),
            description: self.description().map(str::to_string),
            parameters: self.parameters().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Tool not registered: {0}")]
    NotRegistered(String),

    #[error("Invalid tool name: {0}")]
    InvalidName(String),

    #[error("Duplicate tool: {0}")]
    Duplicate(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Serialization(err.to_string())
    }
}
