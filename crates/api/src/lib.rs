//! Order service HTTP API.
//!
//! Exposes the single-item and bulk fulfillment workflows plus read
//! endpoints over the order store, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use fulfillment::{EventPublisher, FulfillmentService, InventoryClient};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, I, P>(state: Arc<AppState<S, I, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S, I, P>))
        .route(
            "/orders",
            post(routes::orders::create::<S, I, P>).get(routes::orders::list::<S, I, P>),
        )
        .route("/orders/bulk", post(routes::orders::create_bulk::<S, I, P>))
        .route("/orders/{id}", get(routes::orders::get::<S, I, P>))
        .route(
            "/orders/user/{user_id}",
            get(routes::orders::list_for_user::<S, I, P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the fulfillment service into shared application state.
pub fn create_state<S, I, P>(store: S, inventory: I, publisher: P) -> Arc<AppState<S, I, P>>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    Arc::new(AppState {
        fulfillment: FulfillmentService::new(store, inventory, publisher),
    })
}
