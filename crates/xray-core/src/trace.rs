//! Trace - Trace and step records
//!
//! A trace is one recorded run of a pipeline. Its steps are the units of work
//! inside that run, each carrying input/output snapshots and optional
//! reasoning. Both are created by the store; ids are opaque strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::{mapping_or_empty, nullable, value_or_empty, vec_or_empty};

/// Arbitrary key/value mapping attached to a trace at start
pub type Metadata = serde_json::Map<String, serde_json::Value>;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a store-assigned identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank; a blank id refers to nothing
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// First eight characters, for compact listings
            #[must_use]
            pub fn short(&self) -> &str {
                match self.0.char_indices().nth(8) {
                    Some((end, _)) => &self.0[..end],
                    None => &self.0,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

opaque_id!(
    /// Store-assigned trace identifier
    TraceId
);

opaque_id!(
    /// Store-assigned step identifier
    StepId
);

/// Trace status
///
/// Traces start `Running` and are moved to a terminal status by a single
/// finish call. Statuses outside the three known values are carried through
/// as `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TraceStatus {
    /// Trace is still being recorded
    Running,
    /// Pipeline finished successfully
    Completed,
    /// Pipeline failed
    Failed,
    /// Any other status string supplied by a caller or a store
    Other(String),
}

impl TraceStatus {
    /// Returns the wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Other(s) => s,
        }
    }

    /// Check if the trace has left the running state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for TraceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TraceStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for TraceStatus {
    fn from(s: &str) -> Self {
        match s {
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TraceStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<TraceStatus> for String {
    fn from(status: TraceStatus) -> Self {
        match status {
            TraceStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A trace record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Store-assigned identifier
    pub id: TraceId,

    /// Human-readable label
    pub name: String,

    /// Metadata captured at start
    #[serde(default, deserialize_with = "mapping_or_empty")]
    pub metadata: Metadata,

    /// Current status
    pub status: TraceStatus,

    /// When the trace was started
    pub started_at: DateTime<Utc>,

    /// When the trace was last finished (if ever)
    #[serde(default, deserialize_with = "nullable")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Default step status when a recorder does not supply one
pub const DEFAULT_STEP_STATUS: &str = "COMPLETED";

pub(crate) fn default_step_status() -> String {
    DEFAULT_STEP_STATUS.to_string()
}

/// An empty JSON mapping, the default for step input and output
#[must_use]
pub fn empty_mapping() -> serde_json::Value {
    serde_json::Value::Object(Metadata::new())
}

/// A step record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Store-assigned identifier
    pub id: StepId,

    /// Owning trace
    pub trace_id: TraceId,

    /// Step label
    pub step_name: String,

    /// Free-form step status, independent of the trace status
    #[serde(default = "default_step_status")]
    pub status: String,

    /// Input snapshot
    #[serde(default = "empty_mapping", deserialize_with = "value_or_empty")]
    pub input: serde_json::Value,

    /// Output snapshot
    #[serde(default = "empty_mapping", deserialize_with = "value_or_empty")]
    pub output: serde_json::Value,

    /// Explanation of the step. `None` means no explanation was recorded,
    /// which is not the same as `Some("")`.
    #[serde(default, deserialize_with = "nullable")]
    pub reasoning: Option<String>,

    /// Parent step within the same trace
    #[serde(default, deserialize_with = "nullable")]
    pub parent_step_id: Option<StepId>,

    /// Presentation order within the trace (not unique, not contiguous)
    #[serde(default)]
    pub order_index: i64,

    /// When the step started
    pub started_at: DateTime<Utc>,

    /// When the step ended
    #[serde(default, deserialize_with = "nullable")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Step {
    /// Wall-clock duration, when both bounds are known and ordered
    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        let ended = self.ended_at?;
        u64::try_from((ended - self.started_at).num_milliseconds()).ok()
    }
}

/// A trace together with all of its steps, as returned by a detail fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceWithSteps {
    /// The trace record
    pub trace: Trace,
    /// Steps in store order
    #[serde(default, deserialize_with = "vec_or_empty")]
    pub steps: Vec<Step>,
}

/// Coerce a caller-supplied value into trace metadata
///
/// `null` becomes an empty mapping; a non-mapping value is kept under a
/// `value` key so that nothing the caller passed is silently dropped.
#[must_use]
pub fn into_metadata(value: serde_json::Value) -> Metadata {
    match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => Metadata::new(),
        other => {
            let mut map = Metadata::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_status_wire_form() {
        assert_eq!(TraceStatus::Running.as_str(), "RUNNING");
        assert_eq!(TraceStatus::from("FAILED"), TraceStatus::Failed);
        assert_eq!(
            TraceStatus::from("CANCELLED"),
            TraceStatus::Other("CANCELLED".to_string())
        );
        assert_eq!(
            serde_json::to_value(TraceStatus::Completed).unwrap(),
            json!("COMPLETED")
        );
        assert!(!TraceStatus::Running.is_terminal());
        assert!(TraceStatus::Other("PAUSED".into()).is_terminal());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(TraceId::new("0123456789abcdef").short(), "01234567");
        assert_eq!(TraceId::new("abc").short(), "abc");
        assert!(TraceId::new("").is_empty());
        assert!(!StepId::new("s1").is_empty());
    }

    #[test]
    fn test_reasoning_absent_vs_empty() {
        let base = json!({
            "id": "s1",
            "trace_id": "t1",
            "step_name": "ranking",
            "started_at": "2026-01-01T00:00:00Z"
        });

        let absent: Step = serde_json::from_value(base.clone()).unwrap();
        assert_eq!(absent.reasoning, None);

        let mut with_null = base.clone();
        with_null["reasoning"] = json!(null);
        let null: Step = serde_json::from_value(with_null).unwrap();
        assert_eq!(null.reasoning, None);

        let mut with_empty = base;
        with_empty["reasoning"] = json!("");
        let empty: Step = serde_json::from_value(with_empty).unwrap();
        assert_eq!(empty.reasoning, Some(String::new()));
    }

    #[test]
    fn test_step_defaults_on_read() {
        let step: Step = serde_json::from_value(json!({
            "id": "s1",
            "trace_id": "t1",
            "step_name": "fetch",
            "input": null,
            "started_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(step.status, "COMPLETED");
        assert_eq!(step.input, json!({}));
        assert_eq!(step.output, json!({}));
        assert_eq!(step.order_index, 0);
        assert_eq!(step.ended_at, None);
        assert_eq!(step.duration_ms(), None);
    }

    #[test]
    fn test_nullable_wrapper_encoding() {
        let step: Step = serde_json::from_value(json!({
            "id": "s2",
            "trace_id": "t1",
            "step_name": "filter",
            "reasoning": {"String": "kept sci-fi", "Valid": true},
            "parent_step_id": {"String": "", "Valid": false},
            "started_at": "2026-01-01T00:00:00Z",
            "ended_at": {"Time": "2026-01-01T00:00:01.500Z", "Valid": true}
        }))
        .unwrap();

        assert_eq!(step.reasoning.as_deref(), Some("kept sci-fi"));
        assert_eq!(step.parent_step_id, None);
        assert_eq!(step.duration_ms(), Some(1500));

        let empty_valid: Step = serde_json::from_value(json!({
            "id": "s3",
            "trace_id": "t1",
            "step_name": "filter",
            "reasoning": {"String": "", "Valid": true},
            "started_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(empty_valid.reasoning, Some(String::new()));
    }

    #[test]
    fn test_detail_with_null_steps() {
        let detail: TraceWithSteps = serde_json::from_value(json!({
            "trace": {
                "id": "t1",
                "name": "Content Recommendation",
                "metadata": null,
                "status": "RUNNING",
                "started_at": "2026-01-01T00:00:00Z"
            },
            "steps": null
        }))
        .unwrap();

        assert!(detail.steps.is_empty());
        assert!(detail.trace.metadata.is_empty());
        assert_eq!(detail.trace.status, TraceStatus::Running);
    }

    #[test]
    fn test_into_metadata() {
        assert!(into_metadata(json!(null)).is_empty());
        assert_eq!(into_metadata(json!({"user_id": "u1"}))["user_id"], "u1");
        assert_eq!(into_metadata(json!(42))["value"], 42);
    }
}
