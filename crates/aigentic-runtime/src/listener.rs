use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use aigentic_core::Message;

/// Observer of an agent's message log.
///
/// Each listener runs in its own task and replays the log from the start; the executor
/// loop never waits for it.
#[async_trait]
pub trait MessageListener: Send + Sync {
    async fn on_message(&self, agent_id: &str, message: &Message);
}

pub struct LoggingListener {
    prefix: String,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            prefix: "[Aigentic]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl MessageListener for LoggingListener {
    async fn on_message(&self, agent_id: &str, message: &Message) {
        match message {
            Message::SystemPrompt { prompt } => {
                debug!(agent_id, "{} System prompt: {}", self.prefix, preview(prompt));
            }
            Message::Text { sender, content } => {
                info!(agent_id, ?sender, "{} Text: {}", self.prefix, preview(content));
            }
            Message::Image { sender, content } => {
                info!(agent_id, ?sender, mime_type = ?content.mime_type, "{} Image", self.prefix);
            }
            Message::ToolCalls { tool_calls, .. } => {
                for call in tool_calls {
                    info!(
                        agent_id,
                        tool = %call.name,
                        call_id = %call.id,
                        "{} Tool call with args: {}",
                        self.prefix,
                        preview(&call.arguments)
                    );
                }
            }
            Message::ToolResult {
                tool_call_id,
                tool_name,
                content,
            } => {
                if content.is_empty() {
                    warn!(agent_id, tool = %tool_name, call_id = %tool_call_id, "{} Empty tool result", self.prefix);
                } else {
                    debug!(
                        agent_id,
                        tool = %tool_name,
                        call_id = %tool_call_id,
                        "{} Tool result: {}",
                        self.prefix,
                        preview(content)
                    );
                }
            }
        }
    }
}

pub struct CallbackListener<F>
where
    F: Fn(&str, &Message) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackListener<F>
where
    F: Fn(&str, &Message) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> MessageListener for CallbackListener<F>
where
    F: Fn(&str, &Message) + Send + Sync,
{
    async fn on_message(&self, agent_id: &str, message: &Message) {
        (self.callback)(agent_id, message)
    }
}

pub fn create_listener<F>(callback: F) -> Arc<dyn MessageListener>
where
    F: Fn(&str, &Message) + Send + Sync + 'static,
{
    Arc::new(CallbackListener::new(callback))
}
