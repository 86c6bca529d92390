//! Gateway error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while forwarding a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The client's request body could not be read.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// The backend could not be reached or did not answer in time.
    #[error("Service unavailable")]
    Unavailable(#[source] reqwest::Error),

    /// The backend answered but its body could not be read.
    #[error("Bad gateway")]
    BadGateway(#[source] reqwest::Error),
}

impl GatewayError {
    /// Short label used for the `error_type` metric dimension.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::InvalidBody(_) => "invalid_body",
            GatewayError::Unavailable(e) if e.is_timeout() => "timeout",
            GatewayError::Unavailable(_) => "connection",
            GatewayError::BadGateway(_) => "upstream_body",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), axum::Json(body)).into_response()
    }
}
