//! Resolution error taxonomy
//!
//! Every failed request maps to exactly one [`ErrorCategory`], and every
//! category to exactly one [`Outcome`]. Metrics and transports work off the
//! enums, never off error messages.

use crate::store::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that terminate a trace resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Query parameters could not be decoded
    #[error("invalid param: {0}")]
    InvalidParam(String),

    /// cluster, resource or name missing
    #[error("cluster or resource or name is empty")]
    EmptyParam,

    #[error("invalid timestamp for ts param: {0}")]
    InvalidTimestamp(#[source] chrono::ParseError),

    #[error("cluster {0} not supported now")]
    UnknownCluster(String),

    #[error("could not find a trace that matches the query")]
    NoMatch,

    /// More than one trace matched; never resolved by picking one
    #[error("{0} traces match the query, expected exactly 1")]
    AmbiguousMatch(usize),

    #[error("trace store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResolveError::InvalidParam(_) => ErrorCategory::InvalidParam,
            ResolveError::EmptyParam => ErrorCategory::EmptyParam,
            ResolveError::InvalidTimestamp(_) => ErrorCategory::InvalidTimestamp,
            ResolveError::UnknownCluster(_) => ErrorCategory::UnknownCluster,
            ResolveError::NoMatch => ErrorCategory::NoTraceMatch,
            ResolveError::AmbiguousMatch(_) => ErrorCategory::MultiTraceMatch,
            ResolveError::Store(_) => ErrorCategory::TraceError,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.category().outcome()
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Failure label recorded per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    InvalidParam,
    EmptyParam,
    InvalidTimestamp,
    UnknownCluster,
    NoTraceMatch,
    MultiTraceMatch,
    TraceError,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::InvalidParam,
        ErrorCategory::EmptyParam,
        ErrorCategory::InvalidTimestamp,
        ErrorCategory::UnknownCluster,
        ErrorCategory::NoTraceMatch,
        ErrorCategory::MultiTraceMatch,
        ErrorCategory::TraceError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::InvalidParam => "InvalidParam",
            ErrorCategory::EmptyParam => "EmptyParam",
            ErrorCategory::InvalidTimestamp => "InvalidTimestamp",
            ErrorCategory::UnknownCluster => "UnknownCluster",
            ErrorCategory::NoTraceMatch => "NoTraceMatch",
            ErrorCategory::MultiTraceMatch => "MultiTraceMatch",
            ErrorCategory::TraceError => "TraceError",
        }
    }

    pub fn outcome(self) -> Outcome {
        match self {
            ErrorCategory::InvalidParam
            | ErrorCategory::EmptyParam
            | ErrorCategory::InvalidTimestamp => Outcome::ValidationFailure,
            ErrorCategory::UnknownCluster => Outcome::UnknownCluster,
            ErrorCategory::NoTraceMatch => Outcome::NoMatch,
            ErrorCategory::MultiTraceMatch => Outcome::AmbiguousMatch,
            ErrorCategory::TraceError => Outcome::StoreFailure,
        }
    }

    /// Position in [`ErrorCategory::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a request result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    ValidationFailure,
    UnknownCluster,
    NoMatch,
    AmbiguousMatch,
    StoreFailure,
}

impl Outcome {
    pub fn of<T>(result: &ResolveResult<T>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) => e.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraceId;

    #[test]
    fn test_category_mapping() {
        assert_eq!(ResolveError::EmptyParam.outcome(), Outcome::ValidationFailure);
        assert_eq!(
            ResolveError::UnknownCluster("dev".into()).category(),
            ErrorCategory::UnknownCluster
        );
        assert_eq!(ResolveError::NoMatch.outcome(), Outcome::NoMatch);
        assert_eq!(
            ResolveError::AmbiguousMatch(2).category(),
            ErrorCategory::MultiTraceMatch
        );
        assert_eq!(
            ResolveError::from(StoreError::NotFound(TraceId::from("aa"))).outcome(),
            Outcome::StoreFailure
        );
    }

    #[test]
    fn test_index_matches_all() {
        for (i, category) in ErrorCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ResolveError::UnknownCluster("dev".into()).to_string(),
            "cluster dev not supported now"
        );
        assert_eq!(
            ResolveError::AmbiguousMatch(3).to_string(),
            "3 traces match the query, expected exactly 1"
        );
    }

    #[test]
    fn test_outcome_of_result() {
        let ok: ResolveResult<()> = Ok(());
        assert_eq!(Outcome::of(&ok), Outcome::Success);
        let err: ResolveResult<()> = Err(ResolveError::NoMatch);
        assert_eq!(Outcome::of(&err), Outcome::NoMatch);
    }
}
