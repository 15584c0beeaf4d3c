//! Recorder - Best-effort trace recording for instrumented pipelines

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use xray_core::trace::into_metadata;
use xray_core::{
    Error, HttpStore, NewTrace, StepId, StoreConfig, TraceId, TraceStatus, TraceStore,
};

use crate::step::StepFields;

/// Default bound on a single store call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Client used by a pipeline to record traces and steps
///
/// Construct one per pipeline run (or share one across runs) and pass it by
/// reference. Cloning is cheap; clones share the same store.
///
/// None of the methods return an error. A failed `start_trace` yields `None`,
/// and every later call given that `None` does nothing, so a pipeline can
/// keep calling the recorder unconditionally.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn TraceStore>,
    call_timeout: Duration,
}

impl Recorder {
    /// Create a recorder over any store backend
    #[must_use]
    pub fn new(store: Arc<dyn TraceStore>) -> Self {
        Self {
            store,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Create a recorder that talks to a remote store over HTTP
    pub fn http(config: StoreConfig) -> xray_core::Result<Self> {
        let call_timeout = config.timeout;
        let store = HttpStore::new(config)?;
        Ok(Self::new(Arc::new(store)).with_call_timeout(call_timeout))
    }

    /// Create an HTTP recorder from environment variables
    pub fn from_env() -> xray_core::Result<Self> {
        Self::http(StoreConfig::from_env())
    }

    /// Set the bound applied to every store call
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Open a new trace
    ///
    /// `metadata` should be a JSON object; `null` records no metadata.
    /// Returns `None` when the store is unreachable, rejects the request or
    /// answers with a blank id;
    /// treat that as "tracing unavailable" and carry on.
    pub async fn start_trace(&self, name: &str, metadata: serde_json::Value) -> Option<TraceId> {
        if !(metadata.is_object() || metadata.is_null()) {
            warn!(trace = %name, "trace metadata is not a mapping; storing it under \"value\"");
        }
        let request = NewTrace {
            name: name.to_string(),
            metadata: into_metadata(metadata),
        };

        match self.bounded(self.store.create_trace(&request)).await {
            Ok(id) if id.is_empty() => {
                warn!(trace = %name, "store returned an empty trace id");
                None
            }
            Ok(id) => {
                debug!(trace_id = %id, trace = %name, "trace started");
                Some(id)
            }
            Err(e) => {
                warn!(trace = %name, error = %e, "failed to start trace");
                None
            }
        }
    }

    /// Append a step to a trace
    ///
    /// Does nothing, and sends nothing, when `trace_id` is `None` or blank. Returns the
    /// new step's id so it can be used as a parent; `None` on no-op or
    /// failure. Calls are sent independently; the store sees them in whatever
    /// order they arrive, so timeline order comes from `order_index`.
    pub async fn add_step(&self, trace_id: Option<&TraceId>, fields: StepFields) -> Option<StepId> {
        let trace_id = trace_id.filter(|id| !id.is_empty())?;
        let request = fields.into_request(trace_id, Utc::now());

        match self.bounded(self.store.create_step(&request)).await {
            Ok(step_id) => {
                debug!(
                    trace_id = %trace_id,
                    step_id = %step_id,
                    step = %request.step_name,
                    order_index = request.order_index,
                    "step recorded"
                );
                Some(step_id)
            }
            Err(e) => {
                warn!(
                    trace_id = %trace_id,
                    step = %request.step_name,
                    error = %e,
                    "failed to add step"
                );
                None
            }
        }
    }

    /// Close a trace with a final status
    ///
    /// Does nothing when `trace_id` is `None` or blank. Calling it again overwrites
    /// the previous status.
    pub async fn finish_trace(&self, trace_id: Option<&TraceId>, status: impl Into<TraceStatus>) {
        let Some(trace_id) = trace_id.filter(|id| !id.is_empty()) else {
            return;
        };
        let status = status.into();

        match self
            .bounded(self.store.update_trace_status(trace_id, &status))
            .await
        {
            Ok(()) => debug!(trace_id = %trace_id, status = %status, "trace finished"),
            Err(e) => warn!(
                trace_id = %trace_id,
                status = %status,
                error = %e,
                "failed to finish trace"
            ),
        }
    }

    /// Close a trace as `COMPLETED`
    pub async fn complete_trace(&self, trace_id: Option<&TraceId>) {
        self.finish_trace(trace_id, TraceStatus::Completed).await;
    }

    /// Close a trace as `FAILED`
    pub async fn fail_trace(&self, trace_id: Option<&TraceId>) {
        self.finish_trace(trace_id, TraceStatus::Failed).await;
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = xray_core::Result<T>>,
    ) -> xray_core::Result<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.call_timeout.as_millis() as u64)),
        }
    }
}
