//! YAML-loadable executor and agent configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use aigentic_core::{AgentError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Delay between permission checks while a tool call is held.
    #[serde(default = "default_poll_interval")]
    pub permission_poll_interval_ms: u64,

    /// Replay buffer size of each agent's message log, and the live channel size too.
    /// A subscriber or listener that falls more than this many messages behind skips
    /// the messages it missed; the skip is only reported with a `warn!`.
    #[serde(default = "default_log_capacity")]
    pub message_log_capacity: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_model_requests: Option<u32>,
}

fn default_poll_interval() -> u64 {
    300
}

fn default_log_capacity() -> usize {
    100
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            permission_poll_interval_ms: default_poll_interval(),
            message_log_capacity: default_log_capacity(),
            max_model_requests: None,
        }
    }
}

impl ExecutorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AgentError::Config(format!("Invalid executor config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.message_log_capacity == 0 {
            return Err(AgentError::Config(
                "message_log_capacity must be greater than zero".to_string(),
            ));
        }
        if self.max_model_requests == Some(0) {
            return Err(AgentError::Config(
                "max_model_requests must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.permission_poll_interval_ms)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.permission_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_max_model_requests(mut self, max: u32) -> Self {
        self.max_model_requests = Some(max);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub description: String,

    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Declarative agent definition. Model and tools are attached in code.
///
/// ```yaml
/// name: news
/// task:
///   description: Summarise today's news
///   instructions:
///     - Fetch ten events
/// contexts:
///   - The reader is based in Europe
/// executor:
///   permission_poll_interval_ms: 100
/// ```
///
/// The `executor` block takes effect through `AgentExecutor::from_spec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,

    pub task: TaskSpec,

    #[serde(default)]
    pub contexts: Vec<String>,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

impl AgentSpec {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(yaml)
            .map_err(|e| AgentError::Config(format!("Invalid agent spec: {}", e)))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AgentError::Config("Agent name cannot be empty".to_string()));
        }
        if self.task.description.trim().is_empty() {
            return Err(AgentError::Config(format!(
                "Agent '{}' has an empty task description",
                self.name
            )));
        }
        self.executor.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_executor_defaults() {
        let config = ExecutorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(300));
        assert_eq!(config.message_log_capacity, 100);
        assert!(config.max_model_requests.is_none());
    }

    #[test]
    fn test_executor_rejects_zero_capacity() {
        let err = ExecutorConfig::from_yaml_str("message_log_capacity: 0").unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_executor_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "permission_poll_interval_ms: 25").unwrap();
        writeln!(file, "max_model_requests: 4").unwrap();

        let config = ExecutorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(25));
        assert_eq!(config.max_model_requests, Some(4));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ExecutorConfig::from_file("/nonexistent/executor.yaml").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to read"));
    }

    #[test]
    fn test_agent_spec_from_yaml() {
        let yaml = r#"
name: news
task:
  description: Summarise today's news
  instructions:
    - Fetch ten events
    - Keep it short
contexts:
  - The reader is based in Europe
executor:
  permission_poll_interval_ms: 50
"#;
        let spec = AgentSpec::from_yaml_str(yaml).unwrap();
        assert_eq!(spec.name, "news");
        assert_eq!(spec.task.instructions.len(), 2);
        assert_eq!(spec.contexts, vec!["The reader is based in Europe"]);
        assert_eq!(spec.executor.permission_poll_interval_ms, 50);
        assert_eq!(spec.executor.message_log_capacity, 100);
    }

    #[test]
    fn test_agent_spec_requires_task_description() {
        let yaml = r#"
name: news
task:
  description: "  "
"#;
        assert!(AgentSpec::from_yaml_str(yaml).is_err());
    }
}
