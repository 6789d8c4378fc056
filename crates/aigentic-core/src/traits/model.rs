//! Model provider contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::message::Message;
use crate::traits::tool::ToolDescription;

/// A stateless LLM endpoint.
///
/// Providers keep no conversation state between requests, so every call carries the
/// full message history and the full tool catalogue.
#[async_trait]
pub trait Model: Send + Sync {
    fn model_id(&self) -> &str;

    fn authentication(&self) -> Authentication {
        Authentication::None
    }

    async fn send_request(
        &self,
        messages: &[Message],
        tools: &[ToolDescription],
    ) -> Result<ModelResponse, ModelError>;
}

#[derive(Clone, PartialEq, Eq, Default)]
pub enum Authentication {
    #[default]
    None,
    ApiKey(String),
    BearerToken(String),
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authentication::None => f.write_str("None"),
            Authentication::ApiKey(_) => f.write_str("ApiKey(***)"),
            Authentication::BearerToken(_) => f.write_str("BearerToken(***)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub message: Message,
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {retry_after:?}")]
    RateLimit {
        retry_after: Option<std::time::Duration>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_debug_hides_secret() {
        let auth = Authentication::ApiKey("sk-secret".to_string());
        assert_eq!(format!("{:?}", auth), "ApiKey(***)");
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(10, 5).total(), 15);
    }
}
