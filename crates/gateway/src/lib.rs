//! Reverse-proxy gateway.
//!
//! The public entry point in front of the inventory and order services.
//! `/api/products...` is forwarded to the inventory service and
//! `/api/orders...` to the order service with the `/api` prefix removed.
//! Method, query, headers and body pass through unchanged in both
//! directions; a backend that cannot be reached yields 503.

pub mod config;
pub mod error;
pub mod proxy;

use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, extract::State};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

pub use proxy::{GatewayState, Upstream};

/// Creates the gateway router.
pub fn create_app(state: Arc<GatewayState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(health))
        .route("/api/products", any(proxy::inventory))
        .route("/api/products/{*rest}", any(proxy::inventory))
        .route("/api/orders", any(proxy::orders))
        .route("/api/orders/{*rest}", any(proxy::orders))
        .with_state(state)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}

/// GET /health: the gateway itself is up.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// GET /metrics: proxy counters in Prometheus text format.
async fn render_metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
