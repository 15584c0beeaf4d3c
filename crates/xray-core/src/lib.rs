//! X-Ray Core - Trace model and store contract
//!
//! This crate provides the shared pieces of the X-Ray tracing system:
//! - Trace: Trace/step records and identifiers
//! - Wire: Request bodies sent to a trace store
//! - Store: The `TraceStore` contract plus HTTP and in-memory backends
//! - Config: Store endpoint configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod store;
pub mod trace;
pub mod wire;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::{HttpStore, MemoryStore, TraceStore};
pub use trace::{Metadata, Step, StepId, Trace, TraceId, TraceStatus, TraceWithSteps};
pub use wire::{NewStep, NewTrace, StatusUpdate};
