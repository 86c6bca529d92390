//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use fulfillment::{EventPublisher, InventoryClient};
use order_store::OrderStore;
use serde::Serialize;

use super::orders::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health: reports whether the order store answers.
pub async fn check<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
) -> (StatusCode, Json<HealthResponse>)
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    match state.fulfillment.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
