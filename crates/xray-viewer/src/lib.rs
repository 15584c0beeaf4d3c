//! X-Ray Viewer - Trace retrieval and reconstruction
//!
//! This crate turns stored traces back into something an operator can read:
//! - Listing: recent traces, with fetch failures reported on the side
//! - Detail: one trace, its steps in timeline order and a step cursor
//! - Timeline: per-step entries and the selected step's detail panel

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod detail;
pub mod listing;
pub mod reconstructor;
pub mod timeline;


pub use detail::{StepCursor, TraceDetail, TraceLookup};
pub use listing::{TraceListing, TraceSummary};
pub use reconstructor::Reconstructor;
pub use timeline::{StepDetail, TimelineEntry};
