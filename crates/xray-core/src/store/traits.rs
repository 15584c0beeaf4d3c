//! Trait for trace store backends

use crate::error::Result;
use crate::trace::{StepId, Trace, TraceId, TraceStatus, TraceWithSteps};
use crate::wire::{NewStep, NewTrace};

/// Trait for trace store backends
///
/// One method per store operation. Each call is an independent request;
/// implementations must not buffer or reorder calls on the caller's behalf.
#[async_trait::async_trait]
pub trait TraceStore: Send + Sync {
    /// Create a trace in `RUNNING` status and return its id
    async fn create_trace(&self, trace: &NewTrace) -> Result<TraceId>;

    /// Overwrite a trace's status
    async fn update_trace_status(&self, id: &TraceId, status: &TraceStatus) -> Result<()>;

    /// Append a step to an existing trace and return its id
    async fn create_step(&self, step: &NewStep) -> Result<StepId>;

    /// All known traces, most recent first
    async fn list_traces(&self) -> Result<Vec<Trace>>;

    /// One trace and all of its steps
    async fn get_trace_detail(&self, id: &TraceId) -> Result<TraceWithSteps>;
}
