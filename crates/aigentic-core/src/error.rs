//! Error types shared across the framework

use thiserror::Error;

use crate::traits::model::ModelError;
use crate::traits::tool::ToolError;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The model answered with something other than a tool call batch.
    #[error("Expected ToolCalls message, got {0}")]
    UnexpectedMessage(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Run was cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}

/// Raised while turning a type description into a `Parameter` tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Unsupported type for field '{field}': {reason}")]
    UnsupportedType { field: String, reason: String },

    #[error("Duplicate parameter '{name}' in object '{object}'")]
    DuplicateParameter { object: String, name: String },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

impl SchemaError {
    pub fn unsupported(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::UnsupportedType {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_message_is_preserved() {
        let err: AgentError = ModelError::Other("boom".to_string()).into();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_unexpected_message_display() {
        let err = AgentError::UnexpectedMessage("text".to_string());
        assert_eq!(err.to_string(), "Expected ToolCalls message, got text");
    }

    #[test]
    fn test_unsupported_type_names_field() {
        let err = SchemaError::unsupported("lookup", "maps are not supported");
        assert!(err.to_string().contains("'lookup'"));
    }
}
