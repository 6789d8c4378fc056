//! Immutable record of one agent execution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunResult {
    Finished {
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<Value>,
    },
    Stuck {
        reason: String,
    },
    Fatal {
        message: String,
    },
}

impl RunResult {
    pub fn finished(description: impl Into<String>, response: Option<Value>) -> Self {
        RunResult::Finished {
            description: description.into(),
            response,
        }
    }

    pub fn stuck(reason: impl Into<String>) -> Self {
        RunResult::Stuck {
            reason: reason.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        RunResult::Fatal {
            message: message.into(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunResult::Finished { .. })
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, RunResult::Stuck { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RunResult::Fatal { .. })
    }
}

/// Token accounting for a single model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequestInfo {
    pub model_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub agent_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model_requests: Vec<ModelRequestInfo>,
    pub result: RunResult,
}

impl Run {
    pub fn total_input_tokens(&self) -> u64 {
        self.model_requests
            .iter()
            .map(|r| r.input_tokens as u64)
            .sum()
    }

    pub fn total_output_tokens(&self) -> u64 {
        self.model_requests
            .iter()
            .map(|r| r.output_tokens as u64)
            .sum()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use serde_json::json;

    fn sample_run(result: RunResult) -> Run {
        let now = Utc::now();
        Run {
            agent_id: "news".to_string(),
            started_at: now,
            finished_at: now,
            messages: vec![
                Message::system_prompt("prompt"),
                Message::text(Sender::Aigentic, "context"),
            ],
            model_requests: vec![
                ModelRequestInfo {
                    model_id: "mock".to_string(),
                    started_at: now,
                    finished_at: now,
                    input_tokens: 12,
                    output_tokens: 3,
                },
                ModelRequestInfo {
                    model_id: "mock".to_string(),
                    started_at: now,
                    finished_at: now,
                    input_tokens: 20,
                    output_tokens: 7,
                },
            ],
            result,
        }
    }

    #[test]
    fn test_token_totals() {
        let run = sample_run(RunResult::stuck("no data"));
        assert_eq!(run.total_input_tokens(), 32);
        assert_eq!(run.total_output_tokens(), 10);
    }

    #[test]
    fn test_run_roundtrips_through_json() {
        for result in [
            RunResult::finished("FinishedAllTasks", Some(json!({"count": 2}))),
            RunResult::stuck("ImStuck"),
            RunResult::fatal("boom"),
        ] {
            let run = sample_run(result);
            let encoded = serde_json::to_string(&run).unwrap();
            let decoded: Run = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, run);
        }
    }

    #[test]
    fn test_result_tag_values() {
        let json = serde_json::to_value(RunResult::fatal("boom")).unwrap();
        assert_eq!(json, json!({"type": "Fatal", "message": "boom"}));
    }
}
