//! Trace locator - maps an object identity to exactly one trace

use crate::error::{ResolveError, ResolveResult};
use crate::identity::{LogicalIdentity, TraceRequest};
use crate::model::Trace;
use crate::query::TraceQuery;
use crate::registry::ClusterRegistry;
use crate::store::TraceStore;
use crate::window::parse_timestamp;
use std::sync::Arc;
use tracing::debug;

/// Resolves identities against a trace store
///
/// Validation happens before any store call: missing fields, then cluster
/// membership, then the timestamp. Only a single matching trace is a
/// success; zero and several matches are distinct failures.
pub struct TraceLocator {
    store: Arc<dyn TraceStore>,
    registry: Arc<dyn ClusterRegistry>,
    service_name: String,
}

impl TraceLocator {
    pub fn new(
        store: Arc<dyn TraceStore>,
        registry: Arc<dyn ClusterRegistry>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            registry,
            service_name: service_name.into(),
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn TraceStore> {
        &self.store
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Validate a raw request into an identity
    pub fn identify(&self, request: &TraceRequest) -> ResolveResult<LogicalIdentity> {
        if !request.has_required_fields() {
            return Err(ResolveError::EmptyParam);
        }

        if !self.registry.contains(&request.cluster) {
            return Err(ResolveError::UnknownCluster(request.cluster.clone()));
        }

        let timestamp = parse_timestamp(&request.ts).map_err(ResolveError::InvalidTimestamp)?;

        LogicalIdentity::new(
            request.cluster.as_str(),
            request.resource.as_str(),
            Some(request.namespace.clone()),
            request.name.as_str(),
            timestamp,
        )
        .ok_or(ResolveError::EmptyParam)
    }

    /// Search the store for the identity's trace
    pub async fn search(&self, identity: &LogicalIdentity) -> ResolveResult<Trace> {
        let query = TraceQuery::for_identity(identity, &self.service_name);
        debug!(
            "Searching traces: operation={} tags={:?} window=[{}, {})",
            query.operation_name, query.tags, query.window.start, query.window.end
        );

        let mut traces = self.store.find_traces(&query).await?;
        match traces.len() {
            0 => Err(ResolveError::NoMatch),
            1 => Ok(traces.remove(0)),
            n => Err(ResolveError::AmbiguousMatch(n)),
        }
    }

    /// Validate the request and find its trace
    pub async fn locate(&self, request: &TraceRequest) -> ResolveResult<Trace> {
        let identity = self.identify(request)?;
        self.search(&identity).await
    }
}
