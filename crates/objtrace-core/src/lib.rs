//! objtrace core - resolving object identities to traces
//!
//! This crate provides the resolution pipeline behind the trace frontend:
//!
//! - **Model**: traces, spans, logs and key/value tags
//! - **Window**: half-hour time bucketing of approximate timestamps
//! - **Locate**: identity to tag query, exactly-one-match policy
//! - **Refetch**: full trace fetch when the search result carries no logs
//! - **Prune**: log filtering by category key
//! - **Resolver**: the request pipeline tying the stages together

pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod locate;
pub mod metrics;
pub mod model;
pub mod prune;
pub mod query;
pub mod refetch;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod window;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigLoader, FrontendConfig};
pub use error::{ErrorCategory, Outcome, ResolveError, ResolveResult};
pub use identity::{LogicalIdentity, TraceRequest};
pub use locate::TraceLocator;
pub use metrics::{RequestMetrics, SharedMetrics};
pub use model::{KeyValue, Log, Process, Span, TagValue, Trace, TraceId};
pub use prune::{prune, PruneCategory};
pub use query::{TraceQuery, DEFAULT_SERVICE_NAME};
pub use refetch::{ensure_logs, LogCompleteness};
pub use registry::{ClusterRegistry, StaticClusterRegistry};
pub use resolver::TraceResolver;
pub use store::{JsonlTraceStore, MemoryTraceStore, StoreError, StoreResult, TraceStore};
pub use window::{bucket, TimeWindow, BUCKET_MINUTES};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
