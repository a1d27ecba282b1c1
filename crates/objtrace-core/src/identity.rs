//! Caller input: the raw trace request and the validated object identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw trace request as decoded from query parameters
///
/// Every field is free text; nothing is validated until the locator runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceRequest {
    pub cluster: String,
    pub resource: String,
    pub namespace: String,
    pub name: String,
    /// RFC 3339 timestamp
    pub ts: String,
    /// Log category to keep; empty keeps everything
    pub span_type: String,
}

impl TraceRequest {
    pub fn new(
        cluster: impl Into<String>,
        resource: impl Into<String>,
        name: impl Into<String>,
        ts: impl Into<String>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            resource: resource.into(),
            name: name.into(),
            ts: ts.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_span_type(mut self, span_type: impl Into<String>) -> Self {
        self.span_type = span_type.into();
        self
    }

    /// Whether cluster, resource and name are all present
    pub fn has_required_fields(&self) -> bool {
        !self.cluster.is_empty() && !self.resource.is_empty() && !self.name.is_empty()
    }
}

/// A validated object identity with its approximate timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalIdentity {
    cluster: String,
    resource: String,
    namespace: Option<String>,
    name: String,
    timestamp: DateTime<Utc>,
}

impl LogicalIdentity {
    /// Build an identity; returns `None` if cluster, resource or name is empty.
    /// An empty namespace is treated as absent.
    pub fn new(
        cluster: impl Into<String>,
        resource: impl Into<String>,
        namespace: Option<String>,
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        let identity = Self {
            cluster: cluster.into(),
            resource: resource.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
            name: name.into(),
            timestamp,
        };
        if identity.cluster.is_empty() || identity.resource.is_empty() || identity.name.is_empty()
        {
            return None;
        }
        Some(identity)
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
