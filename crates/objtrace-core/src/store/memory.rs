//! In-memory trace store

use super::{StoreError, StoreResult, TraceStore};
use crate::model::{Trace, TraceId};
use crate::query::TraceQuery;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Trace store holding complete traces in memory
///
/// With `shallow_search` enabled, search results come back without span
/// logs, the way some backends return a partial projection of a trace from
/// a tag query. Lookups by ID always return the full trace.
#[derive(Debug, Default)]
pub struct MemoryTraceStore {
    traces: RwLock<Vec<Trace>>,
    shallow_search: bool,
    search_failure: RwLock<Option<String>>,
    fetch_failure: RwLock<Option<String>>,
    search_calls: AtomicU64,
    fetch_calls: AtomicU64,
}

impl MemoryTraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traces(traces: Vec<Trace>) -> Self {
        Self {
            traces: RwLock::new(traces),
            ..Default::default()
        }
    }

    /// Strip span logs from search results
    pub fn shallow_search(mut self, shallow: bool) -> Self {
        self.shallow_search = shallow;
        self
    }

    pub fn insert(&self, trace: Trace) {
        self.traces.write().push(trace);
    }

    pub fn len(&self) -> usize {
        self.traces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.read().is_empty()
    }

    /// Make every following search fail as unavailable
    pub fn fail_searches(&self, reason: impl Into<String>) {
        *self.search_failure.write() = Some(reason.into());
    }

    /// Make every following fetch by ID fail as unavailable
    pub fn fail_fetches(&self, reason: impl Into<String>) {
        *self.fetch_failure.write() = Some(reason.into());
    }

    /// Number of `find_traces` calls served
    pub fn search_calls(&self) -> u64 {
        self.search_calls.load(Ordering::Relaxed)
    }

    /// Number of `get_trace` calls served
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TraceStore for MemoryTraceStore {
    async fn find_traces(&self, query: &TraceQuery) -> StoreResult<Vec<Trace>> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(reason) = self.search_failure.read().clone() {
            return Err(StoreError::Unavailable(reason));
        }

        let traces = self.traces.read();
        let found: Vec<Trace> = traces
            .iter()
            .filter(|trace| trace.spans.iter().any(|span| query.matches_span(span)))
            .map(|trace| {
                let mut trace = trace.clone();
                if self.shallow_search {
                    for span in &mut trace.spans {
                        span.logs.clear();
                    }
                }
                trace
            })
            .collect();

        debug!(
            "Memory store search on {} matched {} of {} traces",
            query.operation_name,
            found.len(),
            traces.len()
        );
        Ok(found)
    }

    async fn get_trace(&self, trace_id: &TraceId) -> StoreResult<Trace> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(reason) = self.fetch_failure.read().clone() {
            return Err(StoreError::Unavailable(reason));
        }

        self.traces
            .read()
            .iter()
            .find(|trace| trace.trace_id() == Some(trace_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(trace_id.clone()))
    }
}
