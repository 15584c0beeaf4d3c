//! Timeline - Per-step entries and the selected step's detail panel

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use xray_core::{Step, StepId};

use crate::detail::TraceDetail;

/// Shown in place of a reasoning preview when a step has none
pub const NO_REASONING: &str = "No reasoning provided";

const PREVIEW_LEN: usize = 80;

/// One row of a trace's timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Step ID
    pub step_id: StepId,
    /// Step name
    pub step_name: String,
    /// Step status
    pub status: String,
    /// Order index as recorded
    pub order_index: i64,
    /// Truncated reasoning, or [`NO_REASONING`]
    pub reasoning_preview: String,
    /// Whether the step has reasoning (possibly empty)
    pub has_reasoning: bool,
    /// Step duration in milliseconds
    pub duration_ms: Option<u64>,
    /// Whether another step names this one as its parent
    pub has_children: bool,
    /// Whether this is the selected step
    pub selected: bool,
}

/// Everything the step detail panel shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDetail {
    /// Step ID
    pub step_id: StepId,
    /// Step name
    pub step_name: String,
    /// Step status
    pub status: String,
    /// Reasoning; the panel is shown iff this is `Some`, even when empty
    pub reasoning: Option<String>,
    /// Pretty-printed input
    pub input: String,
    /// Pretty-printed output
    pub output: String,
    /// When the step started
    pub started_at: DateTime<Utc>,
    /// When the step ended
    pub ended_at: Option<DateTime<Utc>>,
}

impl StepDetail {
    /// Whether the reasoning panel should be rendered
    #[must_use]
    pub fn shows_reasoning_panel(&self) -> bool {
        self.reasoning.is_some()
    }
}

impl From<&Step> for StepDetail {
    fn from(step: &Step) -> Self {
        Self {
            step_id: step.id.clone(),
            step_name: step.step_name.clone(),
            status: step.status.clone(),
            reasoning: step.reasoning.clone(),
            input: pretty(&step.input),
            output: pretty(&step.output),
            started_at: step.started_at,
            ended_at: step.ended_at,
        }
    }
}

impl TraceDetail {
    /// Build the timeline rows, in step order
    #[must_use]
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        // Parent ids are only looked up, never followed, so dangling or
        // cyclic references are harmless here.
        let parents: HashSet<&StepId> = self
            .steps()
            .iter()
            .filter_map(|s| s.parent_step_id.as_ref())
            .collect();
        let selected = self.cursor().index();

        self.steps()
            .iter()
            .enumerate()
            .map(|(index, step)| TimelineEntry {
                step_id: step.id.clone(),
                step_name: step.step_name.clone(),
                status: step.status.clone(),
                order_index: step.order_index,
                reasoning_preview: step
                    .reasoning
                    .as_deref()
                    .map(|r| truncate(r, PREVIEW_LEN))
                    .unwrap_or_else(|| NO_REASONING.to_string()),
                has_reasoning: step.reasoning.is_some(),
                duration_ms: step.duration_ms(),
                has_children: parents.contains(&step.id),
                selected: selected == Some(index),
            })
            .collect()
    }

    /// Detail panel for the selected step
    #[must_use]
    pub fn selected_detail(&self) -> Option<StepDetail> {
        self.selected().map(StepDetail::from)
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let cut = max_len.saturating_sub(3);
        let safe_end = s
            .char_indices()
            .take_while(|(i, _)| *i < cut)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..safe_end])
    }
}
