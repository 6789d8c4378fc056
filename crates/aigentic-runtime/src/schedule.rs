use serde::{Deserialize, Serialize};

use crate::agent::Agent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Run each agent exactly once.
    #[default]
    Single,
}

/// A batch of agents executed together by [`crate::AgentExecutor::run_schedule`].
#[derive(Debug, Clone)]
pub struct Schedule {
    agents: Vec<Agent>,
    schedule_type: ScheduleType,
}

impl Schedule {
    pub fn new(agents: Vec<Agent>, schedule_type: ScheduleType) -> Self {
        Self {
            agents,
            schedule_type,
        }
    }

    pub fn single(agents: Vec<Agent>) -> Self {
        Self::new(agents, ScheduleType::Single)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn schedule_type(&self) -> ScheduleType {
        self.schedule_type
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
