//! Log pruning by category key

use crate::model::Trace;

/// Log category selector; `None` keeps every log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneCategory(Option<String>);

impl PruneCategory {
    /// An empty string selects nothing to prune
    pub fn new(category: impl Into<String>) -> Self {
        let category = category.into();
        if category.is_empty() {
            Self(None)
        } else {
            Self(Some(category))
        }
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for PruneCategory {
    fn from(category: &str) -> Self {
        Self::new(category)
    }
}

/// Keep only the logs carrying the category key, preserving their order.
///
/// Spans are never removed; a span without matching logs ends up with an
/// empty log list.
pub fn prune(mut trace: Trace, category: &PruneCategory) -> Trace {
    let Some(key) = category.as_deref() else {
        return trace;
    };

    for span in &mut trace.spans {
        span.logs.retain(|log| log.has_field(key));
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyValue, Log, Process, Span};
    use chrono::{Duration, TimeZone, Utc};

    fn log(second: i64, keys: &[&str]) -> Log {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap() + Duration::seconds(second);
        Log::new(ts, keys.iter().map(|k| KeyValue::string(*k, "v")).collect())
    }

    fn trace() -> Trace {
        let process = Process::new("tracing");
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap();
        Trace::new(vec![
            Span::new("aa", "1", "prod", ts, process.clone())
                .with_log(log(1, &["audit"]))
                .with_log(log(2, &["event"]))
                .with_log(log(3, &["audit", "diff"]))
                .with_log(log(4, &["diff"])),
            Span::new("aa", "2", "prod", ts, process).with_log(log(5, &["event"])),
        ])
    }

    #[test]
    fn test_empty_category_is_noop() {
        let original = trace();
        assert_eq!(prune(original.clone(), &PruneCategory::new("")), original);
        assert_eq!(prune(original.clone(), &PruneCategory::none()), original);
    }

    #[test]
    fn test_keeps_matching_logs_in_order() {
        let pruned = prune(trace(), &PruneCategory::from("audit"));
        let seconds: Vec<u32> = pruned.spans[0]
            .logs
            .iter()
            .map(|l| chrono::Timelike::second(&l.timestamp))
            .collect();
        assert_eq!(seconds, vec![1, 3]);
        assert!(pruned.spans[0].logs.iter().all(|l| l.has_field("audit")));
    }

    #[test]
    fn test_span_without_matches_is_kept_empty() {
        let pruned = prune(trace(), &PruneCategory::from("audit"));
        assert_eq!(pruned.spans.len(), 2);
        assert!(pruned.spans[1].logs.is_empty());
        assert_eq!(pruned.spans[1].span_id, "2");
    }

    #[test]
    fn test_unknown_category_clears_all_logs() {
        let pruned = prune(trace(), &PruneCategory::from("nope"));
        assert_eq!(pruned.log_count(), 0);
        assert_eq!(pruned.spans.len(), 2);
    }
}
