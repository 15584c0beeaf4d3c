//! Row conversion helpers

use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use xray_core::trace::into_metadata;
use xray_core::{Step, StepId, Trace, TraceId, TraceStatus};

/// Timestamps are stored as fixed-width RFC 3339 so that text order is time order
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(format!("invalid timestamp: {e}")))
}

fn parse_json(s: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::from_str(s).map_err(|e| StoreError::Serialization(format!("invalid json: {e}")))
}

/// Convert a SQLite row to a Trace
pub(crate) fn row_to_trace(row: SqliteRow) -> Result<Trace, StoreError> {
    let status: String = row.get("status");
    let metadata_str: String = row.get("metadata");
    let started_at_str: String = row.get("started_at");
    let completed_at_str: Option<String> = row.get("completed_at");

    Ok(Trace {
        id: TraceId::new(row.get::<String, _>("id")),
        name: row.get("name"),
        metadata: into_metadata(parse_json(&metadata_str)?),
        status: TraceStatus::from(status),
        started_at: parse_ts(&started_at_str)?,
        completed_at: completed_at_str.as_deref().map(parse_ts).transpose()?,
    })
}

/// Convert a SQLite row to a Step
pub(crate) fn row_to_step(row: SqliteRow) -> Result<Step, StoreError> {
    let input_str: String = row.get("input");
    let output_str: String = row.get("output");
    let parent_step_id: Option<String> = row.get("parent_step_id");
    let started_at_str: String = row.get("started_at");
    let ended_at_str: Option<String> = row.get("ended_at");

    Ok(Step {
        id: StepId::new(row.get::<String, _>("id")),
        trace_id: TraceId::new(row.get::<String, _>("trace_id")),
        step_name: row.get("step_name"),
        status: row.get("status"),
        input: parse_json(&input_str)?,
        output: parse_json(&output_str)?,
        reasoning: row.get("reasoning"),
        parent_step_id: parent_step_id.map(StepId::new),
        order_index: row.get("order_index"),
        started_at: parse_ts(&started_at_str)?,
        ended_at: ended_at_str.as_deref().map(parse_ts).transpose()?,
    })
}
