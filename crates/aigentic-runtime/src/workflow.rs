use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use aigentic_core::{AgentError, Result, RunResult};

use crate::executor::AgentExecutor;
use crate::typed::{AgentRun, Outcome, TypedAgent};

type Step = Arc<dyn Fn(AgentExecutor, Value) -> BoxFuture<'static, AgentRun<Value>> + Send + Sync>;

/// A chain of typed agents where each finished response becomes the next agent's input.
///
/// The chain stops at the first `Stuck` or `Fatal` outcome. A step that finishes without a
/// response also stops it, and the workflow finishes with no response.
pub struct Workflow<I, O> {
    steps: Vec<Step>,
    _marker: PhantomData<fn(I) -> O>,
}

#[derive(Debug, Clone)]
pub struct WorkflowRun<O> {
    /// One entry per agent that ran, in execution order.
    pub runs: Vec<AgentRun<Value>>,
    pub outcome: Outcome<O>,
}

impl<I, O> Workflow<I, O>
where
    I: Serialize + Send + Sync + 'static,
    O: DeserializeOwned + Serialize + JsonSchema + Send + Sync + 'static,
{
    pub fn new(agent: TypedAgent<I, O>) -> Self {
        Self {
            steps: vec![step(agent)],
            _marker: PhantomData,
        }
    }

    pub fn then<N>(mut self, next: TypedAgent<O, N>) -> Workflow<I, N>
    where
        N: DeserializeOwned + Serialize + JsonSchema + Send + Sync + 'static,
    {
        self.steps.push(step(next));
        Workflow {
            steps: self.steps,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(&self, executor: &AgentExecutor, input: &I) -> Result<WorkflowRun<O>> {
        let mut value = serde_json::to_value(input)?;
        let mut runs = Vec::with_capacity(self.steps.len());
        let last = self.steps.len().saturating_sub(1);

        for (index, step) in self.steps.iter().enumerate() {
            let agent_run = step(executor.clone(), value).await;
            let outcome = agent_run.outcome.clone();
            runs.push(agent_run);

            let outcome = match outcome {
                Outcome::Finished {
                    response: Some(response),
                    ..
                } if index < last => {
                    value = response;
                    continue;
                }
                Outcome::Finished {
                    description,
                    response,
                } => {
                    if index < last {
                        tracing::info!(step = index, "workflow step finished without a response");
                    }
                    Outcome::decode(&RunResult::finished(description, response))
                }
                Outcome::Stuck { reason } => Outcome::Stuck { reason },
                Outcome::Fatal { message } => Outcome::Fatal { message },
            };
            return Ok(WorkflowRun { runs, outcome });
        }

        Err(AgentError::Other("Workflow has no steps".to_string()))
    }
}

fn step<A, B>(agent: TypedAgent<A, B>) -> Step
where
    A: Serialize + Send + Sync + 'static,
    B: DeserializeOwned + Serialize + JsonSchema + Send + Sync + 'static,
{
    let agent = Arc::new(agent);
    Arc::new(move |executor: AgentExecutor, input: Value| {
        let agent = agent.clone();
        Box::pin(async move {
            let agent_run = agent.run_value(&executor, input).await;
            AgentRun {
                run: agent_run.run,
                outcome: agent_run.outcome.into_value(),
            }
        })
    })
}
