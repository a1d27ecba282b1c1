//! HTTP frontend for objtrace
//!
//! Serves resolved object traces to the trace viewer plus health and
//! metrics endpoints.

mod api;
pub mod ui;

pub use api::status_for;
pub use ui::{UiKeyValue, UiLog, UiProcess, UiReference, UiSpan, UiTrace};

use axum::{response::Json, routing::get, Router};
use objtrace_core::TraceResolver;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Web server configuration
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub resolver: TraceResolver,
}

/// Build the router over a resolver
pub fn router(resolver: TraceResolver) -> Router {
    let state = Arc::new(AppState { resolver });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/extensions/api/v1/trace", get(api::get_trace))
        .route("/api/metrics", get(api::get_metrics))
        .route("/metrics", get(api::get_metrics_prometheus))
        .route("/api/health", get(health_check))
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn start_server(config: WebConfig, resolver: TraceResolver) -> anyhow::Result<()> {
    let app = router(resolver);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Trace frontend listening on http://{}", addr);
    info!("  - Traces at /extensions/api/v1/trace");
    info!("  - Metrics at /metrics and /api/metrics");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Health check endpoint for liveness probes
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "objtrace",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
