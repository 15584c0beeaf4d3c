//! Store - Access to the trace store
//!
//! The `TraceStore` trait mirrors the store's request/response contract.
//! `HttpStore` talks to a remote store over REST; `MemoryStore` keeps
//! everything in process.

mod http;
mod memory;
mod traits;


pub use http::HttpStore;
pub use memory::MemoryStore;
pub use traits::TraceStore;
