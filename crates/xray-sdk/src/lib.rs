//! X-Ray SDK - Trace recorder
//!
//! The `Recorder` is what instrumented pipelines hold on to. It opens a
//! trace, appends steps as work happens and closes the trace with a final
//! status. Every call is best-effort: store failures are logged and turned
//! into `None`/no-ops, never into errors seen by the pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod recorder;
pub mod step;


pub use recorder::Recorder;
pub use step::StepFields;
pub use xray_core::{StepId, StoreConfig, TraceId, TraceStatus};
