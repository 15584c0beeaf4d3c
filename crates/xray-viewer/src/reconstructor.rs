//! Reconstructor - Fetches traces and rebuilds them for viewing

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};
use xray_core::{Error, HttpStore, StoreConfig, TraceId, TraceStore};

use crate::detail::{TraceDetail, TraceLookup};
use crate::listing::TraceListing;

/// Default bound on a single store call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Read side of the trace system
#[derive(Clone)]
pub struct Reconstructor {
    store: Arc<dyn TraceStore>,
    call_timeout: Duration,
}

impl Reconstructor {
    /// Create a reconstructor over any store backend
    #[must_use]
    pub fn new(store: Arc<dyn TraceStore>) -> Self {
        Self {
            store,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Create a reconstructor reading from a remote store over HTTP
    pub fn http(config: StoreConfig) -> xray_core::Result<Self> {
        let call_timeout = config.timeout;
        let store = HttpStore::new(config)?;
        Ok(Self::new(Arc::new(store)).with_call_timeout(call_timeout))
    }

    /// Set the bound applied to every store call
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// List all known traces, most recent first
    ///
    /// A failed fetch yields an empty listing that carries the error.
    #[instrument(skip(self))]
    pub async fn list_traces(&self) -> TraceListing {
        let fetched = tokio::time::timeout(self.call_timeout, self.store.list_traces()).await;

        match fetched.unwrap_or_else(|_| Err(self.timed_out())) {
            Ok(traces) => {
                debug!(count = traces.len(), "traces listed");
                TraceListing::loaded(traces)
            }
            Err(e) => {
                error!(error = %e, "failed to list traces");
                TraceListing::failed(e)
            }
        }
    }

    /// Fetch one trace with all its steps
    #[instrument(skip(self), fields(trace_id = %trace_id))]
    pub async fn get_trace_detail(&self, trace_id: &TraceId) -> TraceLookup {
        let fetched =
            tokio::time::timeout(self.call_timeout, self.store.get_trace_detail(trace_id)).await;

        match fetched.unwrap_or_else(|_| Err(self.timed_out())) {
            Ok(mut bundle) => {
                let before = bundle.steps.len();
                bundle.steps.retain(|step| &step.trace_id == trace_id);
                if bundle.steps.len() != before {
                    warn!(
                        dropped = before - bundle.steps.len(),
                        "store returned steps belonging to another trace"
                    );
                }
                debug!(steps = bundle.steps.len(), "trace loaded");
                TraceLookup::Loaded(TraceDetail::new(bundle))
            }
            Err(e) if e.is_not_found() => {
                debug!("trace not found");
                TraceLookup::NotFound(trace_id.clone())
            }
            Err(e) => {
                error!(error = %e, "failed to load trace");
                TraceLookup::Failed(e.to_string())
            }
        }
    }

    fn timed_out(&self) -> Error {
        Error::Timeout(self.call_timeout.as_millis() as u64)
    }
}
