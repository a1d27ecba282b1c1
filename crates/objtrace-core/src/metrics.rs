//! Request metrics for the trace frontend
//!
//! One counter per outcome label plus request latency, exported as
//! Prometheus text or JSON.

use crate::error::{ErrorCategory, ResolveResult};
use chrono::Duration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type SharedMetrics = Arc<RequestMetrics>;

/// Per-request counters
#[derive(Debug)]
pub struct RequestMetrics {
    /// When the collector was started
    start_time: Instant,
    /// Requests seen
    requests: AtomicU64,
    /// Successful resolutions
    successes: AtomicU64,
    /// Resolutions that refetched the full trace
    refetches: AtomicU64,
    /// Failures, indexed like `ErrorCategory::ALL`
    errors: [AtomicU64; ErrorCategory::ALL.len()],
    /// Cumulative request latency in microseconds
    latency_us_total: AtomicU64,
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            refetches: AtomicU64::new(0),
            errors: Default::default(),
            latency_us_total: AtomicU64::new(0),
        }
    }

    pub fn shared() -> SharedMetrics {
        Arc::new(Self::new())
    }

    /// Count one finished request
    pub fn record<T>(&self, result: &ResolveResult<T>, elapsed: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match result {
            Ok(_) => {
                self.successes.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => self.record_error(e.category()),
        }
        let micros = elapsed.num_microseconds().unwrap_or(i64::MAX).max(0) as u64;
        self.latency_us_total.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn record_error(&self, category: ErrorCategory) {
        self.errors[category.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refetch(&self) {
        self.refetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn refetches(&self) -> u64 {
        self.refetches.load(Ordering::Relaxed)
    }

    pub fn errors(&self, category: ErrorCategory) -> u64 {
        self.errors[category.index()].load(Ordering::Relaxed)
    }

    pub fn latency_us_total(&self) -> u64 {
        self.latency_us_total.load(Ordering::Relaxed)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP objtrace_uptime_seconds Time since the frontend started\n");
        output.push_str("# TYPE objtrace_uptime_seconds gauge\n");
        output.push_str(&format!(
            "objtrace_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        output.push_str("# HELP objtrace_trace_requests_total Trace requests handled\n");
        output.push_str("# TYPE objtrace_trace_requests_total counter\n");
        output.push_str(&format!(
            "objtrace_trace_requests_total{{error=\"\"}} {}\n",
            self.successes()
        ));
        for category in ErrorCategory::ALL {
            output.push_str(&format!(
                "objtrace_trace_requests_total{{error=\"{}\"}} {}\n",
                category,
                self.errors(category)
            ));
        }
        output.push('\n');

        output.push_str("# HELP objtrace_trace_refetches_total Full trace fetches after a log-less search result\n");
        output.push_str("# TYPE objtrace_trace_refetches_total counter\n");
        output.push_str(&format!(
            "objtrace_trace_refetches_total {}\n\n",
            self.refetches()
        ));

        output.push_str(
            "# HELP objtrace_trace_request_duration_seconds_sum Cumulative trace request latency\n",
        );
        output.push_str("# TYPE objtrace_trace_request_duration_seconds_sum counter\n");
        output.push_str(&format!(
            "objtrace_trace_request_duration_seconds_sum {:.6}\n",
            self.latency_us_total() as f64 / 1_000_000.0
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let errors: serde_json::Map<String, serde_json::Value> = ErrorCategory::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), self.errors(*c).into()))
            .collect();

        serde_json::json!({
            "uptime_seconds": self.uptime_seconds(),
            "requests": self.requests(),
            "successes": self.successes(),
            "refetches": self.refetches(),
            "errors": errors,
            "latency_us_total": self.latency_us_total(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;

    #[test]
    fn test_record_outcomes() {
        let metrics = RequestMetrics::new();
        metrics.record(&Ok::<(), ResolveError>(()), Duration::milliseconds(3));
        metrics.record(&Err::<(), _>(ResolveError::NoMatch), Duration::milliseconds(1));
        metrics.record(&Err::<(), _>(ResolveError::AmbiguousMatch(2)), Duration::zero());

        assert_eq!(metrics.requests(), 3);
        assert_eq!(metrics.successes(), 1);
        assert_eq!(metrics.errors(ErrorCategory::NoTraceMatch), 1);
        assert_eq!(metrics.errors(ErrorCategory::MultiTraceMatch), 1);
        assert_eq!(metrics.errors(ErrorCategory::TraceError), 0);
        assert_eq!(metrics.latency_us_total(), 4000);
    }

    #[test]
    fn test_prometheus_output() {
        let metrics = RequestMetrics::new();
        metrics.record_error(ErrorCategory::UnknownCluster);
        let text = metrics.to_prometheus();
        assert!(text.contains("objtrace_trace_requests_total{error=\"UnknownCluster\"} 1"));
        assert!(text.contains("objtrace_trace_requests_total{error=\"\"} 0"));
    }

    #[test]
    fn test_json_output() {
        let metrics = RequestMetrics::new();
        metrics.record_refetch();
        let json = metrics.to_json();
        assert_eq!(json["refetches"], 1);
        assert_eq!(json["errors"]["EmptyParam"], 0);
    }
}
