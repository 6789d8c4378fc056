use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use aigentic_core::{Message, Result, Run, RunResult, Sender};

use crate::agent::{Agent, AgentBuilder};
use crate::executor::AgentExecutor;

/// Run outcome with the structured response decoded into `O`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<O> {
    Finished {
        description: String,
        response: Option<O>,
    },
    Stuck {
        reason: String,
    },
    Fatal {
        message: String,
    },
}

impl<O> Outcome<O> {
    pub fn is_finished(&self) -> bool {
        matches!(self, Outcome::Finished { .. })
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, Outcome::Stuck { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal { .. })
    }

    pub fn response(&self) -> Option<&O> {
        match self {
            Outcome::Finished { response, .. } => response.as_ref(),
            _ => None,
        }
    }
}

impl<O: DeserializeOwned> Outcome<O> {
    /// Decodes a finished response. A response that does not fit `O` becomes `Fatal`.
    pub fn decode(result: &RunResult) -> Self {
        match result {
            RunResult::Finished {
                description,
                response,
            } => match response.clone().map(serde_json::from_value::<O>).transpose() {
                Ok(response) => Outcome::Finished {
                    description: description.clone(),
                    response,
                },
                Err(err) => Outcome::Fatal {
                    message: format!("Failed to decode agent response: {}", err),
                },
            },
            RunResult::Stuck { reason } => Outcome::Stuck {
                reason: reason.clone(),
            },
            RunResult::Fatal { message } => Outcome::Fatal {
                message: message.clone(),
            },
        }
    }
}

impl<O: Serialize> Outcome<O> {
    pub(crate) fn into_value(self) -> Outcome<Value> {
        match self {
            Outcome::Finished {
                description,
                response,
            } => match response.map(|r| serde_json::to_value(r)).transpose() {
                Ok(response) => Outcome::Finished {
                    description,
                    response,
                },
                Err(err) => Outcome::Fatal {
                    message: err.to_string(),
                },
            },
            Outcome::Stuck { reason } => Outcome::Stuck { reason },
            Outcome::Fatal { message } => Outcome::Fatal { message },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentRun<O> {
    pub run: Run,
    pub outcome: Outcome<O>,
}

/// An agent taking `I` as input and answering with `O`.
#[derive(Debug, Clone)]
pub struct TypedAgent<I, O> {
    agent: Agent,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> TypedAgent<I, O>
where
    I: Serialize,
    O: DeserializeOwned + JsonSchema,
{
    /// Builds the agent with its response schema derived from `O`.
    pub fn new(builder: AgentBuilder) -> Result<Self> {
        Ok(Self {
            agent: builder.response_type::<O>()?.build()?,
            _marker: PhantomData,
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The input is sent as a JSON text message after the agent's contexts.
    pub async fn run(&self, executor: &AgentExecutor, input: &I) -> Result<AgentRun<O>> {
        let input = serde_json::to_value(input)?;
        Ok(self.run_value(executor, input).await)
    }

    pub(crate) async fn run_value(&self, executor: &AgentExecutor, input: Value) -> AgentRun<O> {
        let message = Message::text(Sender::Aigentic, input.to_string());
        let run = executor.run_with_input(&self.agent, vec![message]).await;
        let outcome = Outcome::decode(&run.result);
        AgentRun { run, outcome }
    }
}
