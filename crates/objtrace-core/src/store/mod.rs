//! Trace store abstraction
//!
//! The resolution pipeline only needs two capabilities from a span store:
//! a tag/time range search and a lookup by trace ID. Stores own persistence;
//! any retry policy belongs to the store client, not to callers of this trait.

mod jsonl;
mod memory;

pub use jsonl::JsonlTraceStore;
pub use memory::MemoryTraceStore;

use crate::model::{Trace, TraceId};
use crate::query::TraceQuery;
use async_trait::async_trait;
use thiserror::Error;

/// Trace store error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Trace store unavailable: {0}")]
    Unavailable(String),

    #[error("Trace not found: {0}")]
    NotFound(TraceId),

    #[error("Invalid trace record at line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to a span store
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// All traces with at least one span matching the query
    async fn find_traces(&self, query: &TraceQuery) -> StoreResult<Vec<Trace>>;

    /// The full trace with the given ID
    async fn get_trace(&self, trace_id: &TraceId) -> StoreResult<Trace>;
}
