use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;

use aigentic_core::{
    Message, Model, ModelError, ModelResponse, TokenUsage, ToolCall, ToolDescription,
};
use aigentic_tools::{FINISHED_OR_STUCK_TOOL, FinishReason, STUCK_TOOL};

/// Scripted model for tests and demos.
///
/// Responses are handed out in the order they were added. Clones share the same script and
/// call history, so a test can keep one clone while the agent owns another.
#[derive(Clone)]
pub struct MockModel {
    model_id: Arc<str>,
    inner: Arc<RwLock<MockModelInner>>,
}

struct MockModelInner {
    responses: VecDeque<ModelResponse>,
    call_history: Vec<MockCall>,
    should_error: bool,
    error_message: String,
    latency_ms: u64,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDescription>,
    pub timestamp: std::time::Instant,
}

impl MockModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: Arc::from(model_id.into()),
            inner: Arc::new(RwLock::new(MockModelInner {
                responses: VecDeque::new(),
                call_history: Vec::new(),
                should_error: false,
                error_message: "Mock error".to_string(),
                latency_ms: 0,
            })),
        }
    }

    pub fn add_response(&self, response: ModelResponse) {
        self.inner.write().responses.push_back(response);
    }

    /// Queues a `ToolCalls` response with the given calls.
    pub fn add_tool_calls(&self, calls: Vec<ToolCall>) {
        self.add_response(ModelResponse::new(Message::tool_calls(calls)));
    }

    pub fn add_tool_call(&self, name: &str, arguments: Value) {
        self.add_tool_calls(vec![ToolCall::with_value(name, &arguments)]);
    }

    pub fn add_finished(&self, description: &str, response: Option<Value>) {
        self.add_tool_calls(vec![finished_call(description, response)]);
    }

    pub fn add_stuck(&self, description: &str) {
        self.add_tool_calls(vec![stuck_call(description)]);
    }

    pub fn set_error(&self, error_message: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.should_error = true;
        inner.error_message = error_message.into();
    }

    pub fn clear_error(&self) {
        self.inner.write().should_error = false;
    }

    pub fn set_latency(&self, latency_ms: u64) {
        self.inner.write().latency_ms = latency_ms;
    }

    pub fn call_count(&self) -> usize {
        self.inner.read().call_history.len()
    }

    pub fn call_history(&self) -> Vec<MockCall> {
        self.inner.read().call_history.clone()
    }

    pub fn last_call(&self) -> Option<MockCall> {
        self.inner.read().call_history.last().cloned()
    }

    pub fn remaining(&self) -> usize {
        self.inner.read().responses.len()
    }

    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.responses.clear();
        inner.call_history.clear();
        inner.should_error = false;
        inner.error_message = "Mock error".to_string();
        inner.latency_ms = 0;
    }

    fn record_call(&self, messages: &[Message], tools: &[ToolDescription]) {
        self.inner.write().call_history.push(MockCall {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            timestamp: std::time::Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        let latency_ms = self.inner.read().latency_ms;
        if latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(latency_ms)).await;
        }
    }

    fn estimate_tokens(messages: &[Message]) -> u32 {
        let total_chars: usize = messages
            .iter()
            .map(|m| serde_json::to_string(m).map(|s| s.len()).unwrap_or_default())
            .sum();
        (total_chars / 4) as u32
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl Model for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn send_request(
        &self,
        messages: &[Message],
        tools: &[ToolDescription],
    ) -> Result<ModelResponse, ModelError> {
        self.record_call(messages, tools);
        self.simulate_latency().await;

        let next = {
            let mut inner = self.inner.write();
            if inner.should_error {
                return Err(ModelError::Other(inner.error_message.clone()));
            }
            inner.responses.pop_front()
        };

        let mut response = next.ok_or_else(|| {
            ModelError::Other("MockModel has no scripted response left".to_string())
        })?;

        if response.usage.is_none() {
            let input_tokens = Self::estimate_tokens(messages);
            let output_tokens = Self::estimate_tokens(std::slice::from_ref(&response.message));
            response.usage = Some(TokenUsage::new(input_tokens, output_tokens));
        }

        tracing::debug!(
            model = %self.model_id,
            kind = response.message.kind(),
            "mock response"
        );
        Ok(response)
    }
}

/// A `finishedOrStuck` call reporting that all tasks are done.
pub fn finished_call(description: &str, response: Option<Value>) -> ToolCall {
    let mut arguments = json!({
        "finishReason": FinishReason::FinishedAllTasks.as_str(),
        "description": description,
    });
    if let (Some(response), Some(map)) = (response, arguments.as_object_mut()) {
        map.insert("response".to_string(), response);
    }
    ToolCall::with_value(FINISHED_OR_STUCK_TOOL, &arguments)
}

pub fn stuck_call(description: &str) -> ToolCall {
    ToolCall::with_value(
        STUCK_TOOL,
        &json!({
            "finishReason": FinishReason::ImStuck.as_str(),
            "description": description,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigentic_core::Sender;

    fn history() -> Vec<Message> {
        vec![
            Message::system_prompt("You are a news agent"),
            Message::text(Sender::Aigentic, "Find the news"),
        ]
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let model = MockModel::default();
        model.add_tool_call("getNewsEvents", json!({ "count": 10 }));
        model.add_finished("done", None);

        let first = model.send_request(&history(), &[]).await.unwrap();
        match first.message {
            Message::ToolCalls { tool_calls, .. } => {
                assert_eq!(tool_calls[0].name, "getNewsEvents");
                assert_eq!(tool_calls[0].arguments, r#"{"count":10}"#);
            }
            other => panic!("unexpected message {:?}", other),
        }

        let second = model.send_request(&history(), &[]).await.unwrap();
        match second.message {
            Message::ToolCalls { tool_calls, .. } => {
                assert_eq!(tool_calls[0].name, "finishedOrStuck");
            }
            other => panic!("unexpected message {:?}", other),
        }

        assert_eq!(model.call_count(), 2);
        assert_eq!(model.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_is_error() {
        let model = MockModel::default();
        let err = model.send_request(&history(), &[]).await.unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let model = MockModel::default();
        model.add_finished("never", None);
        model.set_error("boom");

        let err = model.send_request(&history(), &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(model.call_count(), 1);

        model.clear_error();
        assert!(model.send_request(&history(), &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_usage_is_estimated() {
        let model = MockModel::default();
        model.add_stuck("no sources");
        let response = model.send_request(&history(), &[]).await.unwrap();
        let usage = response.usage.unwrap();
        assert!(usage.input_tokens > 0);
        assert!(usage.output_tokens > 0);
    }

    #[tokio::test]
    async fn test_clones_share_history() {
        let model = MockModel::new("scripted");
        let handle = model.clone();
        model.add_stuck("no sources");
        handle.send_request(&history(), &[]).await.unwrap();

        assert_eq!(model.call_count(), 1);
        assert_eq!(model.model_id(), "scripted");
        assert_eq!(model.last_call().unwrap().messages, history());
    }

    #[test]
    fn test_finished_call_payload() {
        let call = finished_call("done", Some(json!({ "count": 2 })));
        let value: Value = serde_json::from_str(&call.arguments).unwrap();
        assert_eq!(
            value,
            json!({
                "finishReason": "FinishedAllTasks",
                "description": "done",
                "response": { "count": 2 }
            })
        );
    }
}
