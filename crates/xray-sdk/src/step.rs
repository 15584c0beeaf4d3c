//! StepFields - What a pipeline reports about one unit of work

use chrono::{DateTime, Utc};
use xray_core::trace::{empty_mapping, DEFAULT_STEP_STATUS};
use xray_core::{NewStep, StepId, TraceId};

/// Fields for a single `add_step` call
///
/// Only the step name is required. Everything left unset gets its default
/// when the step is sent: status `COMPLETED`, empty input and output, no
/// reasoning, both timestamps set to the moment of recording, order 0.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFields {
    /// Step label
    pub step_name: String,
    /// Free-form status
    pub status: Option<String>,
    /// Input snapshot
    pub input: Option<serde_json::Value>,
    /// Output snapshot
    pub output: Option<serde_json::Value>,
    /// Explanation; `Some("")` is kept as an empty explanation
    pub reasoning: Option<String>,
    /// Parent step in the same trace
    pub parent_step_id: Option<StepId>,
    /// Start of the step
    pub started_at: Option<DateTime<Utc>>,
    /// End of the step
    pub ended_at: Option<DateTime<Utc>>,
    /// Position in the trace's timeline
    pub order_index: Option<i64>,
}

impl StepFields {
    /// Start describing a step
    #[must_use]
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: None,
            input: None,
            output: None,
            reasoning: None,
            parent_step_id: None,
            started_at: None,
            ended_at: None,
            order_index: None,
        }
    }

    /// Set the step status
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the input snapshot
    #[must_use]
    pub fn input(mut self, input: serde_json::Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the output snapshot
    #[must_use]
    pub fn output(mut self, output: serde_json::Value) -> Self {
        self.output = Some(output);
        self
    }

    /// Attach an explanation
    #[must_use]
    pub fn reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Nest this step under another step of the same trace
    #[must_use]
    pub fn parent(mut self, parent: StepId) -> Self {
        self.parent_step_id = Some(parent);
        self
    }

    /// Set when the step started
    #[must_use]
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    /// Set when the step ended
    #[must_use]
    pub fn ended_at(mut self, at: DateTime<Utc>) -> Self {
        self.ended_at = Some(at);
        self
    }

    /// Set the timeline position
    #[must_use]
    pub fn order_index(mut self, index: i64) -> Self {
        self.order_index = Some(index);
        self
    }

    /// Build the store request, filling defaults with `now` for timestamps
    #[must_use]
    pub fn into_request(self, trace_id: &TraceId, now: DateTime<Utc>) -> NewStep {
        NewStep {
            trace_id: trace_id.clone(),
            step_name: self.step_name,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_STEP_STATUS.to_string()),
            input: self.input.unwrap_or_else(empty_mapping),
            output: self.output.unwrap_or_else(empty_mapping),
            reasoning: self.reasoning,
            parent_step_id: self.parent_step_id,
            started_at: Some(self.started_at.unwrap_or(now)),
            ended_at: Some(self.ended_at.unwrap_or(now)),
            order_index: self.order_index.unwrap_or(0),
        }
    }
}
