//! Tag-based trace queries derived from an object identity

use crate::identity::LogicalIdentity;
use crate::model::{find_by_key, Span, TagValue};
use crate::window::TimeWindow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Service name object traces are recorded under
pub const DEFAULT_SERVICE_NAME: &str = "tracing (exclusive)";

pub const TAG_RESOURCE: &str = "resource";
pub const TAG_NAMESPACE: &str = "namespace";
pub const TAG_NAME: &str = "name";

/// Search parameters handed to a trace store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceQuery {
    /// Fixed service sentinel (not the cluster)
    pub service_name: String,

    /// Cluster name
    pub operation_name: String,

    /// Tags every matching span must carry
    pub tags: BTreeMap<String, String>,

    /// Span start time bounds
    pub window: TimeWindow,
}

impl TraceQuery {
    /// Build the query for an identity; the window is the bucket of its timestamp
    pub fn for_identity(identity: &LogicalIdentity, service_name: &str) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(TAG_RESOURCE.to_string(), identity.resource().to_string());
        tags.insert(TAG_NAME.to_string(), identity.name().to_string());
        if let Some(namespace) = identity.namespace() {
            tags.insert(TAG_NAMESPACE.to_string(), namespace.to_string());
        }

        Self {
            service_name: service_name.to_string(),
            operation_name: identity.cluster().to_string(),
            tags,
            window: TimeWindow::containing(identity.timestamp()),
        }
    }

    /// Whether a single span satisfies every query condition
    pub fn matches_span(&self, span: &Span) -> bool {
        span.process.service_name == self.service_name
            && span.operation_name == self.operation_name
            && self.window.contains(span.start_time)
            && self.tags.iter().all(|(key, expected)| {
                matches!(
                    find_by_key(&span.tags, key).map(|kv| &kv.value),
                    Some(TagValue::String(actual)) if actual == expected
                )
            })
    }
}
