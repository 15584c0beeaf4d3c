//! X-Ray Store - Reference trace store
//!
//! Serves the trace store contract over REST, backed by SQLite:
//! - Repository: trace/step persistence (sqlx)
//! - Routes: axum handlers under `/api`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod repository;
pub mod routes;
mod rows;

#[cfg(test)]
mod tests;

pub use error::{Result, StoreError};
pub use repository::{default_data_dir, default_db_path, TraceRepository};
pub use routes::{router, serve};
