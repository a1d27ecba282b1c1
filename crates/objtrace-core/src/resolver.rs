//! Request orchestration - locate, complete, prune
//!
//! Each stage either hands its trace to the next one or ends the request with
//! a categorized error. At most two store calls happen per request, one after
//! the other. Dropping the returned future abandons the in-flight store call.

use crate::clock::{Clock, SystemClock};
use crate::error::ResolveResult;
use crate::identity::TraceRequest;
use crate::locate::TraceLocator;
use crate::metrics::SharedMetrics;
use crate::model::Trace;
use crate::prune::{prune, PruneCategory};
use crate::query::DEFAULT_SERVICE_NAME;
use crate::refetch::ensure_logs;
use crate::registry::ClusterRegistry;
use crate::store::TraceStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves trace requests into pruned, log-complete traces
pub struct TraceResolver {
    locator: TraceLocator,
    clock: Arc<dyn Clock>,
    metrics: Option<SharedMetrics>,
}

impl TraceResolver {
    pub fn new(
        store: Arc<dyn TraceStore>,
        registry: Arc<dyn ClusterRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            locator: TraceLocator::new(store, registry, DEFAULT_SERVICE_NAME),
            clock,
            metrics: None,
        }
    }

    /// Resolver on the wall clock
    pub fn with_system_clock(
        store: Arc<dyn TraceStore>,
        registry: Arc<dyn ClusterRegistry>,
    ) -> Self {
        Self::new(store, registry, Arc::new(SystemClock))
    }

    /// Search under a different service name
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.locator = self.locator.with_service_name(service_name);
        self
    }

    /// Record every request into `metrics`
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn locator(&self) -> &TraceLocator {
        &self.locator
    }

    pub fn metrics(&self) -> Option<&SharedMetrics> {
        self.metrics.as_ref()
    }

    /// Resolve a request into its trace
    pub async fn resolve(&self, request: &TraceRequest) -> ResolveResult<Trace> {
        let started = self.clock.now();
        let result = self.run(request).await;

        if let Some(metrics) = &self.metrics {
            metrics.record(&result, self.clock.now() - started);
        }
        result
    }

    async fn run(&self, request: &TraceRequest) -> ResolveResult<Trace> {
        let trace = self.locator.locate(request).await?;

        let completeness = ensure_logs(self.locator.store().as_ref(), trace).await?;
        if completeness.was_refetched() {
            if let Some(metrics) = &self.metrics {
                metrics.record_refetch();
            }
        }
        let trace = completeness.into_trace();

        let category = PruneCategory::new(request.span_type.as_str());
        let before = trace.log_count();
        let trace = prune(trace, &category);
        debug!(
            "Pruned logs by {:?}: {} -> {}",
            category.as_deref(),
            before,
            trace.log_count()
        );

        info!(
            "Resolved {}/{} in {} to trace {}",
            request.resource,
            request.name,
            request.cluster,
            trace.trace_id().map(|id| id.as_str()).unwrap_or("<empty>")
        );
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{ErrorCategory, Outcome, ResolveError};
    use crate::metrics::RequestMetrics;
    use crate::model::{KeyValue, Log, Process, Span, TraceId};
    use crate::query::TraceQuery;
    use crate::registry::StaticClusterRegistry;
    use crate::store::{MemoryTraceStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn span(trace_id: &str, span_id: &str, minute: u32) -> Span {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 10, minute, 0).unwrap();
        Span::new(trace_id, span_id, "prod", ts, Process::new(DEFAULT_SERVICE_NAME))
            .with_tag(KeyValue::string("resource", "pods"))
            .with_tag(KeyValue::string("name", "foo-123"))
    }

    fn log(key: &str) -> Log {
        Log::new(
            Utc.with_ymd_and_hms(2023, 1, 1, 10, 6, 0).unwrap(),
            vec![KeyValue::string(key, "v")],
        )
    }

    fn logged_trace(id: &str) -> Trace {
        Trace::new(vec![
            span(id, "1", 6).with_log(log("audit")).with_log(log("event")),
            span(id, "2", 7).with_log(log("event")),
        ])
    }

    fn resolver(store: Arc<MemoryTraceStore>) -> TraceResolver {
        let registry = Arc::new(StaticClusterRegistry::new(["prod"]));
        TraceResolver::with_system_clock(store, registry)
    }

    fn request() -> TraceRequest {
        TraceRequest::new("prod", "pods", "foo-123", "2023-01-01T10:05:00Z")
    }

    #[tokio::test]
    async fn test_resolves_and_prunes() {
        let store = Arc::new(MemoryTraceStore::with_traces(vec![logged_trace("aa")]));
        let resolver = resolver(store.clone());

        let trace = resolver
            .resolve(&request().with_span_type("audit"))
            .await
            .unwrap();
        assert_eq!(trace.trace_id(), Some(&TraceId::from("aa")));
        assert_eq!(trace.spans.len(), 2);
        assert_eq!(trace.spans[0].logs.len(), 1);
        assert!(trace.spans[1].logs.is_empty());
        // logs were present, no refetch
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_span_type_keeps_logs() {
        let store = Arc::new(MemoryTraceStore::with_traces(vec![logged_trace("aa")]));
        let trace = resolver(store).resolve(&request()).await.unwrap();
        assert_eq!(trace, logged_trace("aa"));
    }

    #[tokio::test]
    async fn test_refetches_log_less_search_result() {
        let store = Arc::new(
            MemoryTraceStore::with_traces(vec![logged_trace("aa")]).shallow_search(true),
        );
        let metrics = RequestMetrics::shared();
        let resolver = resolver(store.clone()).with_metrics(metrics.clone());

        let trace = resolver.resolve(&request()).await.unwrap();
        assert_eq!(trace.log_count(), 3);
        assert_eq!(store.search_calls(), 1);
        assert_eq!(store.fetch_calls(), 1);
        assert_eq!(metrics.refetches(), 1);
    }

    #[tokio::test]
    async fn test_ambiguous_is_an_error() {
        let store = Arc::new(MemoryTraceStore::with_traces(vec![
            logged_trace("aa"),
            logged_trace("bb"),
        ]));
        let err = resolver(store.clone()).resolve(&request()).await.unwrap_err();
        assert_eq!(err.outcome(), Outcome::AmbiguousMatch);
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_makes_no_store_calls() {
        let store = Arc::new(MemoryTraceStore::with_traces(vec![logged_trace("aa")]));
        let resolver = resolver(store.clone());

        let err = resolver
            .resolve(&TraceRequest::new("prod", "pods", "", "2023-01-01T10:05:00Z"))
            .await
            .unwrap_err();
        assert_eq!(err.outcome(), Outcome::ValidationFailure);

        let err = resolver
            .resolve(&TraceRequest::new("dev", "pods", "foo-123", "2023-01-01T10:05:00Z"))
            .await
            .unwrap_err();
        assert_eq!(err.outcome(), Outcome::UnknownCluster);

        assert_eq!(store.search_calls(), 0);
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_refetch_failure_returns_no_trace() {
        let store = Arc::new(
            MemoryTraceStore::with_traces(vec![logged_trace("aa")]).shallow_search(true),
        );
        store.fail_fetches("timeout");

        let err = resolver(store).resolve(&request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }

    #[tokio::test]
    async fn test_metrics_record_category_and_latency() {
        let store = Arc::new(MemoryTraceStore::new());
        let registry = Arc::new(StaticClusterRegistry::new(["prod"]));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let metrics = RequestMetrics::shared();
        let resolver =
            TraceResolver::new(store, registry, clock).with_metrics(metrics.clone());

        let err = resolver.resolve(&request()).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NoTraceMatch);
        assert_eq!(metrics.requests(), 1);
        assert_eq!(metrics.errors(ErrorCategory::NoTraceMatch), 1);
        assert_eq!(metrics.latency_us_total(), 0);
    }

    #[tokio::test]
    async fn test_custom_service_name() {
        let store = Arc::new(MemoryTraceStore::with_traces(vec![logged_trace("aa")]));
        let resolver = resolver(store).with_service_name("other");
        assert_eq!(resolver.locator().service_name(), "other");

        let err = resolver.resolve(&request()).await.unwrap_err();
        assert_eq!(err.outcome(), Outcome::NoMatch);
    }

    /// Store whose searches never complete
    #[derive(Default)]
    struct PendingStore {
        searches: AtomicU64,
    }

    #[async_trait]
    impl TraceStore for PendingStore {
        async fn find_traces(&self, _query: &TraceQuery) -> StoreResult<Vec<Trace>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn get_trace(&self, trace_id: &TraceId) -> StoreResult<Trace> {
            Err(StoreError::NotFound(trace_id.clone()))
        }
    }

    #[test]
    fn test_dropping_request_abandons_store_call() {
        let store = Arc::new(PendingStore::default());
        let registry = Arc::new(StaticClusterRegistry::new(["prod"]));
        let metrics = RequestMetrics::shared();
        let resolver =
            TraceResolver::with_system_clock(store.clone(), registry).with_metrics(metrics.clone());

        let request = request();
        let mut pending = tokio_test::task::spawn(resolver.resolve(&request));
        tokio_test::assert_pending!(pending.poll());
        drop(pending);

        assert_eq!(store.searches.load(Ordering::SeqCst), 1);
        // abandoned requests are not counted
        assert_eq!(metrics.requests(), 0);
    }
}
