//! Detail - One trace with its steps in timeline order

use xray_core::{Step, StepId, Trace, TraceId, TraceWithSteps};

/// Outcome of fetching one trace
///
/// Every variant is a final state the view can render; none of them means
/// "still loading".
#[derive(Debug, Clone)]
pub enum TraceLookup {
    /// Trace and steps were fetched
    Loaded(TraceDetail),
    /// The store does not know this trace
    NotFound(TraceId),
    /// The fetch failed for any other reason
    Failed(String),
}

impl TraceLookup {
    /// The loaded detail, if any
    #[must_use]
    pub fn loaded(self) -> Option<TraceDetail> {
        match self {
            Self::Loaded(detail) => Some(detail),
            Self::NotFound(_) | Self::Failed(_) => None,
        }
    }

    /// Whether the trace was reported missing
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Position of the selected step within a loaded trace
///
/// Only `TraceDetail` moves the cursor, and only onto an index inside its
/// own step list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCursor {
    selected: Option<usize>,
}

impl StepCursor {
    fn first_of(steps: &[Step]) -> Self {
        Self {
            selected: (!steps.is_empty()).then_some(0),
        }
    }

    /// Index of the selected step
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.selected
    }

    /// Whether a step is selected
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.selected.is_some()
    }
}

/// A trace and its steps, ordered for presentation
#[derive(Debug, Clone)]
pub struct TraceDetail {
    trace: Trace,
    steps: Vec<Step>,
    cursor: StepCursor,
}

impl TraceDetail {
    /// Order the fetched steps and select the first one
    ///
    /// Steps are sorted by `order_index`; equal indices keep the order the
    /// store returned them in, which is creation order.
    #[must_use]
    pub fn new(bundle: TraceWithSteps) -> Self {
        let mut steps = bundle.steps;
        steps.sort_by_key(|step| step.order_index);
        let cursor = StepCursor::first_of(&steps);

        Self {
            trace: bundle.trace,
            steps,
            cursor,
        }
    }

    /// The trace record
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Steps in timeline order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether the trace has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Current cursor
    #[must_use]
    pub fn cursor(&self) -> StepCursor {
        self.cursor
    }

    /// The selected step
    #[must_use]
    pub fn selected(&self) -> Option<&Step> {
        self.cursor.selected.and_then(|i| self.steps.get(i))
    }

    /// Select a step by id; unknown ids leave the selection unchanged
    pub fn select(&mut self, step_id: &StepId) -> bool {
        match self.steps.iter().position(|s| &s.id == step_id) {
            Some(index) => {
                self.cursor.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Select a step by timeline position; out-of-range indices are ignored
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.steps.len() {
            self.cursor.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Move the selection one step forward, stopping at the last step
    pub fn select_next(&mut self) -> bool {
        match self.cursor.selected {
            Some(i) => self.select_index(i + 1),
            None => self.select_index(0),
        }
    }

    /// Move the selection one step back, stopping at the first step
    pub fn select_previous(&mut self) -> bool {
        match self.cursor.selected {
            Some(i) if i > 0 => self.select_index(i - 1),
            _ => false,
        }
    }
}
