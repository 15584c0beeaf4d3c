//! Listing - Recent traces for the trace list view

use chrono::{DateTime, Utc};
use serde::Serialize;
use xray_core::{Error, Trace, TraceId, TraceStatus};

/// One row of the trace list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    /// Trace ID
    pub id: TraceId,
    /// First characters of the id, for display
    pub short_id: String,
    /// Trace name
    pub name: String,
    /// Status
    pub status: TraceStatus,
    /// When the trace started
    pub started_at: DateTime<Utc>,
    /// When the trace was finished, if it was
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Trace> for TraceSummary {
    fn from(trace: Trace) -> Self {
        Self {
            short_id: trace.id.short().to_string(),
            id: trace.id,
            name: trace.name,
            status: trace.status,
            started_at: trace.started_at,
            completed_at: trace.completed_at,
        }
    }
}

/// Result of listing traces
///
/// Iterates the fetched traces once, in the order the store returned them
/// (most recent first). A failed fetch iterates nothing; use
/// [`TraceListing::fetch_error`] to tell that apart from an empty store.
#[derive(Debug)]
pub struct TraceListing {
    traces: std::vec::IntoIter<Trace>,
    error: Option<Error>,
}

impl TraceListing {
    pub(crate) fn loaded(traces: Vec<Trace>) -> Self {
        Self {
            traces: traces.into_iter(),
            error: None,
        }
    }

    pub(crate) fn failed(error: Error) -> Self {
        Self {
            traces: Vec::new().into_iter(),
            error: Some(error),
        }
    }

    /// The error that emptied this listing, if the fetch failed
    #[must_use]
    pub fn fetch_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Whether the fetch failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

impl Iterator for TraceListing {
    type Item = TraceSummary;

    fn next(&mut self) -> Option<Self::Item> {
        self.traces.next().map(TraceSummary::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.traces.size_hint()
    }
}

impl ExactSizeIterator for TraceListing {}
