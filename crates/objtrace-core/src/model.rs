//! Trace model - traces, spans, logs and tags as handed out by a trace store
//!
//! The store owns these records; the resolution pipeline only reads them,
//! replaces them wholesale (refetch) or filters span logs (prune).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trace identifier as issued by the store (hex encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TraceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TraceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A complete trace: an ordered collection of spans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Spans in store order
    pub spans: Vec<Span>,

    /// Store-side warnings attached to the trace
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Trace {
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            warnings: Vec::new(),
        }
    }

    /// Whether the trace has no spans at all
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Whether at least one span carries a log entry
    pub fn has_logs(&self) -> bool {
        self.spans.iter().any(|span| !span.logs.is_empty())
    }

    /// Trace ID of the first span, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.spans.first().map(|span| &span.trace_id)
    }

    /// Total number of log entries across all spans
    pub fn log_count(&self) -> usize {
        self.spans.iter().map(|span| span.logs.len()).sum()
    }
}

/// A single timed operation within a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Trace this span belongs to
    pub trace_id: TraceId,

    /// Span ID
    pub span_id: String,

    /// Parent span ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// Operation name
    pub operation_name: String,

    /// Start time
    pub start_time: DateTime<Utc>,

    /// Duration in microseconds
    #[serde(default)]
    pub duration_us: u64,

    /// Span tags
    #[serde(default)]
    pub tags: Vec<KeyValue>,

    /// Log entries, in emission order
    #[serde(default)]
    pub logs: Vec<Log>,

    /// Emitting process
    pub process: Process,
}

impl Span {
    pub fn new(
        trace_id: impl Into<TraceId>,
        span_id: impl Into<String>,
        operation_name: impl Into<String>,
        start_time: DateTime<Utc>,
        process: Process,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
            operation_name: operation_name.into(),
            start_time,
            duration_us: 0,
            tags: Vec::new(),
            logs: Vec::new(),
            process,
        }
    }

    pub fn with_tag(mut self, tag: KeyValue) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }

    /// Look up a span tag by key
    pub fn find_tag(&self, key: &str) -> Option<&KeyValue> {
        find_by_key(&self.tags, key)
    }
}

/// Process that emitted a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub service_name: String,

    #[serde(default)]
    pub tags: Vec<KeyValue>,
}

impl Process {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            tags: Vec::new(),
        }
    }
}

/// A timestamped, tagged annotation on a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub fields: Vec<KeyValue>,
}

impl Log {
    pub fn new(timestamp: DateTime<Utc>, fields: Vec<KeyValue>) -> Self {
        Self { timestamp, fields }
    }

    /// Whether any field carries the given key
    pub fn has_field(&self, key: &str) -> bool {
        find_by_key(&self.fields, key).is_some()
    }
}

/// Key/value tag used on spans, processes and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: TagValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: TagValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, TagValue::String(value.into()))
    }
}

/// Tag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl TagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Type name as rendered for the UI
    pub fn type_name(&self) -> &'static str {
        match self {
            TagValue::Bool(_) => "bool",
            TagValue::Int64(_) => "int64",
            TagValue::Float64(_) => "float64",
            TagValue::String(_) => "string",
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(v) => write!(f, "{}", v),
            TagValue::Int64(v) => write!(f, "{}", v),
            TagValue::Float64(v) => write!(f, "{}", v),
            TagValue::String(v) => f.write_str(v),
        }
    }
}

/// First entry with the given key
pub fn find_by_key<'a>(values: &'a [KeyValue], key: &str) -> Option<&'a KeyValue> {
    values.iter().find(|kv| kv.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 10, 5, 0).unwrap()
    }

    #[test]
    fn test_has_logs() {
        let span = Span::new("abc", "1", "update", ts(), Process::new("tracing"));
        let mut trace = Trace::new(vec![span.clone()]);
        assert!(!trace.has_logs());

        trace.spans.push(span.with_log(Log::new(ts(), vec![KeyValue::string("audit", "x")])));
        assert!(trace.has_logs());
        assert_eq!(trace.log_count(), 1);
    }

    #[test]
    fn test_trace_id_of_first_span() {
        let trace = Trace::new(vec![
            Span::new("aaa", "1", "create", ts(), Process::new("tracing")),
            Span::new("bbb", "2", "update", ts(), Process::new("tracing")),
        ]);
        assert_eq!(trace.trace_id(), Some(&TraceId::from("aaa")));
        assert_eq!(Trace::default().trace_id(), None);
    }

    #[test]
    fn test_tag_value_json() {
        let kv: KeyValue = serde_json::from_str(r#"{"key":"code","value":404}"#).unwrap();
        assert_eq!(kv.value, TagValue::Int64(404));

        let kv: KeyValue = serde_json::from_str(r#"{"key":"verb","value":"delete"}"#).unwrap();
        assert_eq!(kv.value.as_str(), Some("delete"));
        assert_eq!(kv.value.type_name(), "string");
    }

    #[test]
    fn test_find_by_key() {
        let log = Log::new(
            ts(),
            vec![KeyValue::string("event", "x"), KeyValue::string("audit", "y")],
        );
        assert!(log.has_field("audit"));
        assert!(!log.has_field("diff"));
    }
}
