//! Completeness refetch
//!
//! A tag search may hand back a trace projection without span logs. When
//! that happens the trace is fetched again by ID, once.

use crate::error::ResolveResult;
use crate::model::Trace;
use crate::store::TraceStore;
use tracing::debug;

/// Result of the completeness check
#[derive(Debug, Clone, PartialEq)]
pub enum LogCompleteness {
    /// At least one span already carried logs
    Complete(Trace),
    /// No spans, nothing to refetch
    Empty(Trace),
    /// Replaced by the full trace fetched by ID
    Refetched(Trace),
}

impl LogCompleteness {
    pub fn into_trace(self) -> Trace {
        match self {
            LogCompleteness::Complete(trace)
            | LogCompleteness::Empty(trace)
            | LogCompleteness::Refetched(trace) => trace,
        }
    }

    pub fn was_refetched(&self) -> bool {
        matches!(self, LogCompleteness::Refetched(_))
    }
}

/// Refetch `trace` by its first span's trace ID if no span carries logs
pub async fn ensure_logs(store: &dyn TraceStore, trace: Trace) -> ResolveResult<LogCompleteness> {
    if trace.has_logs() {
        return Ok(LogCompleteness::Complete(trace));
    }
    if trace.is_empty() {
        return Ok(LogCompleteness::Empty(trace));
    }

    let trace_id = &trace.spans[0].trace_id;
    debug!("Trace {} carries no logs, fetching full trace", trace_id);
    let full = store.get_trace(trace_id).await?;
    Ok(LogCompleteness::Refetched(full))
}
