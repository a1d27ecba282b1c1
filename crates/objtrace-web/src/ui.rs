//! UiTrace - trace document in the shape the trace viewer consumes
//!
//! Timestamps and durations are microseconds. Processes are deduplicated and
//! referenced from spans by key (`p1`, `p2`, ...), in order of first use.

use objtrace_core::model::{KeyValue, Log, Process, Span, TagValue, Trace};
use serde::Serialize;
use std::collections::BTreeMap;

/// Trace as rendered for the viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiTrace {
    #[serde(rename = "traceID")]
    pub trace_id: String,

    pub spans: Vec<UiSpan>,

    pub processes: BTreeMap<String, UiProcess>,

    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSpan {
    #[serde(rename = "traceID")]
    pub trace_id: String,

    #[serde(rename = "spanID")]
    pub span_id: String,

    pub operation_name: String,

    pub references: Vec<UiReference>,

    /// Unix timestamp in microseconds
    pub start_time: i64,

    /// Microseconds
    pub duration: u64,

    pub tags: Vec<UiKeyValue>,

    pub logs: Vec<UiLog>,

    #[serde(rename = "processID")]
    pub process_id: String,

    pub warnings: Vec<String>,
}

/// Parent link of a span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiReference {
    #[serde(rename = "refType")]
    pub ref_type: &'static str,

    #[serde(rename = "traceID")]
    pub trace_id: String,

    #[serde(rename = "spanID")]
    pub span_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiKeyValue {
    pub key: String,

    #[serde(rename = "type")]
    pub value_type: &'static str,

    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiLog {
    /// Unix timestamp in microseconds
    pub timestamp: i64,

    pub fields: Vec<UiKeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiProcess {
    pub service_name: String,

    pub tags: Vec<UiKeyValue>,
}

impl UiTrace {
    /// Render a trace; does not modify or reorder its spans
    pub fn from_trace(trace: &Trace) -> Self {
        let mut seen: Vec<&Process> = Vec::new();
        let mut processes = BTreeMap::new();

        let spans = trace
            .spans
            .iter()
            .map(|span| {
                let position = match seen.iter().position(|p| **p == span.process) {
                    Some(position) => position,
                    None => {
                        seen.push(&span.process);
                        let position = seen.len() - 1;
                        processes.insert(process_key(position), UiProcess::from(&span.process));
                        position
                    }
                };
                UiSpan::from_span(span, process_key(position))
            })
            .collect();

        Self {
            trace_id: trace
                .trace_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            spans,
            processes,
            warnings: trace.warnings.clone(),
        }
    }
}

impl UiSpan {
    fn from_span(span: &Span, process_id: String) -> Self {
        let references = span
            .parent_span_id
            .iter()
            .map(|parent| UiReference {
                ref_type: "CHILD_OF",
                trace_id: span.trace_id.to_string(),
                span_id: parent.clone(),
            })
            .collect();

        Self {
            trace_id: span.trace_id.to_string(),
            span_id: span.span_id.clone(),
            operation_name: span.operation_name.clone(),
            references,
            start_time: span.start_time.timestamp_micros(),
            duration: span.duration_us,
            tags: render_values(&span.tags),
            logs: span.logs.iter().map(UiLog::from).collect(),
            process_id,
            warnings: Vec::new(),
        }
    }
}

impl From<&KeyValue> for UiKeyValue {
    fn from(kv: &KeyValue) -> Self {
        Self {
            key: kv.key.clone(),
            value_type: kv.value.type_name(),
            value: kv.value.clone(),
        }
    }
}

impl From<&Log> for UiLog {
    fn from(log: &Log) -> Self {
        Self {
            timestamp: log.timestamp.timestamp_micros(),
            fields: render_values(&log.fields),
        }
    }
}

impl From<&Process> for UiProcess {
    fn from(process: &Process) -> Self {
        Self {
            service_name: process.service_name.clone(),
            tags: render_values(&process.tags),
        }
    }
}

fn render_values(values: &[KeyValue]) -> Vec<UiKeyValue> {
    values.iter().map(UiKeyValue::from).collect()
}

fn process_key(position: usize) -> String {
    format!("p{}", position + 1)
}
