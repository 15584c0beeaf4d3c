//! Wire - Request bodies for the trace store and lenient decoding helpers
//!
//! Stores may encode an absent optional either as JSON `null` or as a
//! nullable wrapper object (`{"String": "...", "Valid": true}`,
//! `{"Time": "...", "Valid": false}`). Both decode to `Option<T>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::trace::{
    default_step_status, empty_mapping, into_metadata, Metadata, StepId, TraceId, TraceStatus,
};

/// Body of `POST /traces`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrace {
    /// Human-readable label
    pub name: String,
    /// Metadata captured at start
    #[serde(default, deserialize_with = "mapping_or_empty")]
    pub metadata: Metadata,
}

/// Body of `PATCH /traces/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// New status; last write wins
    pub status: TraceStatus,
}

/// Body of `POST /steps`
///
/// `reasoning: None` is sent as `null` so the store can tell it apart from
/// an empty explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStep {
    /// Owning trace
    pub trace_id: TraceId,
    /// Step label
    pub step_name: String,
    /// Free-form step status
    #[serde(default = "default_step_status")]
    pub status: String,
    /// Input snapshot
    #[serde(default = "empty_mapping", deserialize_with = "value_or_empty")]
    pub input: serde_json::Value,
    /// Output snapshot
    #[serde(default = "empty_mapping", deserialize_with = "value_or_empty")]
    pub output: serde_json::Value,
    /// Optional explanation
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Optional parent step in the same trace
    #[serde(default)]
    pub parent_step_id: Option<StepId>,
    /// Start of the step; stores default it to the time of receipt
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// End of the step
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// Presentation order within the trace
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Nullable<T> {
    Wrapped {
        #[serde(rename = "Valid")]
        valid: bool,
        #[serde(rename = "String", alias = "Time")]
        value: Option<T>,
    },
    Plain(Option<T>),
}

pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Nullable::<T>::deserialize(deserializer)? {
        Nullable::Wrapped { valid, value } => value.filter(|_| valid),
        Nullable::Plain(value) => value,
    })
}

pub(crate) fn value_or_empty<'de, D>(deserializer: D) -> Result<serde_json::Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.unwrap_or_else(empty_mapping))
}

pub(crate) fn mapping_or_empty<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(into_metadata).unwrap_or_default())
}

pub(crate) fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
