//! Conversation messages exchanged between the orchestrator and the model

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// The orchestrator side of the conversation.
    Aigentic,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallId(String);

impl ToolCallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single tool invocation requested by the model.
///
/// Arguments travel as a JSON-encoded string; they are parsed only when the call is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: ToolCallId,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: ToolCallId::new(id),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn with_value(name: impl Into<String>, arguments: &serde_json::Value) -> Self {
        Self {
            id: ToolCallId::generate(),
            name: name.into(),
            arguments: arguments.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Base64 payload or URL.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    SystemPrompt {
        prompt: String,
    },
    Text {
        sender: Sender,
        content: String,
    },
    Image {
        sender: Sender,
        content: ImageContent,
    },
    ToolCalls {
        sender: Sender,
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        tool_call_id: ToolCallId,
        tool_name: String,
        content: String,
    },
}

impl Message {
    pub fn system_prompt(prompt: impl Into<String>) -> Self {
        Message::SystemPrompt {
            prompt: prompt.into(),
        }
    }

    pub fn text(sender: Sender, content: impl Into<String>) -> Self {
        Message::Text {
            sender,
            content: content.into(),
        }
    }

    pub fn image(sender: Sender, content: ImageContent) -> Self {
        Message::Image { sender, content }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Message::ToolCalls {
            sender: Sender::Model,
            tool_calls,
        }
    }

    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Message::ToolResult {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::SystemPrompt { .. } => "system_prompt",
            Message::Text { .. } => "text",
            Message::Image { .. } => "image",
            Message::ToolCalls { .. } => "tool_calls",
            Message::ToolResult { .. } => "tool_result",
        }
    }

    pub fn sender(&self) -> Sender {
        match self {
            Message::Text { sender, .. }
            | Message::Image { sender, .. }
            | Message::ToolCalls { sender, .. } => *sender,
            Message::SystemPrompt { .. } | Message::ToolResult { .. } => Sender::Aigentic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_copies_call_identity() {
        let call = ToolCall::new("call-1", "getNewsEvents", r#"{"count":10}"#);
        let message = Message::tool_result(&call, "[]");
        match message {
            Message::ToolResult {
                tool_call_id,
                tool_name,
                content,
            } => {
                assert_eq!(tool_call_id.as_str(), "call-1");
                assert_eq!(tool_name, "getNewsEvents");
                assert_eq!(content, "[]");
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_tool_calls_are_sent_by_model() {
        let message = Message::tool_calls(vec![]);
        assert_eq!(message.sender(), Sender::Model);
        assert_eq!(message.kind(), "tool_calls");
    }

    #[test]
    fn test_message_json_is_tagged() {
        let message = Message::text(Sender::Aigentic, "hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["sender"], "Aigentic");
        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
