//! MemoryStore - In-process trace store

use super::traits::TraceStore;
use crate::error::{Error, Result};
use crate::trace::{Step, StepId, Trace, TraceId, TraceStatus, TraceWithSteps};
use crate::wire::{NewStep, NewTrace};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    traces: Vec<Trace>,
    steps: Vec<Step>,
}

/// Trace store kept entirely in memory
///
/// Follows the same rules as the reference HTTP store: new traces start
/// `RUNNING`, steps need an existing trace (and an existing parent step in
/// the same trace, when one is named). Detail fetches return steps in
/// arrival order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps recorded across all traces
    pub async fn step_count(&self) -> usize {
        self.inner.read().await.steps.len()
    }
}

fn bad_request(message: impl Into<String>) -> Error {
    Error::Store {
        status: 400,
        body: message.into(),
    }
}

#[async_trait::async_trait]
impl TraceStore for MemoryStore {
    async fn create_trace(&self, trace: &NewTrace) -> Result<TraceId> {
        if trace.name.trim().is_empty() {
            return Err(bad_request("trace name is required"));
        }

        let record = Trace {
            id: TraceId::new(Uuid::new_v4().to_string()),
            name: trace.name.clone(),
            metadata: trace.metadata.clone(),
            status: TraceStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
        };
        let id = record.id.clone();

        self.inner.write().await.traces.push(record);
        debug!(trace_id = %id, "trace created in memory");
        Ok(id)
    }

    async fn update_trace_status(&self, id: &TraceId, status: &TraceStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let trace = inner
            .traces
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("trace {id}")))?;

        trace.status = status.clone();
        trace.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn create_step(&self, step: &NewStep) -> Result<StepId> {
        if step.step_name.trim().is_empty() {
            return Err(bad_request("step_name is required"));
        }

        let mut inner = self.inner.write().await;
        if !inner.traces.iter().any(|t| t.id == step.trace_id) {
            return Err(Error::NotFound(format!("trace {}", step.trace_id)));
        }
        if let Some(parent) = &step.parent_step_id {
            let known = inner
                .steps
                .iter()
                .any(|s| &s.id == parent && s.trace_id == step.trace_id);
            if !known {
                return Err(bad_request(format!(
                    "parent step {parent} does not exist in trace {}",
                    step.trace_id
                )));
            }
        }

        let now = Utc::now();
        let record = Step {
            id: StepId::new(Uuid::new_v4().to_string()),
            trace_id: step.trace_id.clone(),
            step_name: step.step_name.clone(),
            status: step.status.clone(),
            input: step.input.clone(),
            output: step.output.clone(),
            reasoning: step.reasoning.clone(),
            parent_step_id: step.parent_step_id.clone(),
            order_index: step.order_index,
            started_at: step.started_at.unwrap_or(now),
            ended_at: step.ended_at,
        };
        let id = record.id.clone();

        inner.steps.push(record);
        Ok(id)
    }

    async fn list_traces(&self) -> Result<Vec<Trace>> {
        let inner = self.inner.read().await;
        let mut traces: Vec<Trace> = inner.traces.iter().rev().cloned().collect();
        traces.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(traces)
    }

    async fn get_trace_detail(&self, id: &TraceId) -> Result<TraceWithSteps> {
        let inner = self.inner.read().await;
        let trace = inner
            .traces
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("trace {id}")))?;

        let steps = inner
            .steps
            .iter()
            .filter(|s| &s.trace_id == id)
            .cloned()
            .collect();

        Ok(TraceWithSteps { trace, steps })
    }
}
