//! REST API handlers

use crate::ui::UiTrace;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, RawQuery, State},
    http::{header, Extensions, StatusCode},
    response::{IntoResponse, Json, Response},
};
use objtrace_core::{Outcome, ResolveError, ResolveResult, Trace, TraceRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// HTTP status for a request outcome
pub fn status_for(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Success => StatusCode::OK,
        Outcome::ValidationFailure => StatusCode::BAD_REQUEST,
        Outcome::UnknownCluster | Outcome::NoMatch => StatusCode::NOT_FOUND,
        Outcome::AmbiguousMatch | Outcome::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /extensions/api/v1/trace`
pub async fn get_trace(
    State(state): State<Arc<AppState>>,
    extensions: Extensions,
    RawQuery(raw_query): RawQuery,
    query: Result<Query<TraceRequest>, QueryRejection>,
) -> Response {
    let source = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    info!(
        "GET /extensions/api/v1/trace source={} query={}",
        source,
        raw_query.as_deref().unwrap_or("")
    );

    let result = match query {
        Ok(Query(request)) => state.resolver.resolve(&request).await,
        Err(rejection) => {
            let result: ResolveResult<Trace> =
                Err(ResolveError::InvalidParam(rejection.body_text()));
            if let Some(metrics) = state.resolver.metrics() {
                metrics.record(&result, chrono::Duration::zero());
            }
            result
        }
    };

    match result {
        Ok(trace) => Json(UiTrace::from_trace(&trace)).into_response(),
        Err(err) => {
            error!("source={} {} ({})", source, err, err.category());
            (
                status_for(err.outcome()),
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                err.to_string(),
            )
                .into_response()
        }
    }
}

/// JSON metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.resolver.metrics() {
        Some(metrics) => Json(metrics.to_json()),
        None => Json(serde_json::json!({ "error": "metrics not enabled" })),
    }
}

/// Prometheus metrics
pub async fn get_metrics_prometheus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.resolver.metrics() {
        Some(metrics) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            metrics.to_prometheus(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "# Metrics not enabled\n".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(Outcome::Success), StatusCode::OK);
        assert_eq!(status_for(Outcome::ValidationFailure), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(Outcome::UnknownCluster), StatusCode::NOT_FOUND);
        assert_eq!(status_for(Outcome::NoMatch), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(Outcome::AmbiguousMatch),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(Outcome::StoreFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
