//! Request forwarding to the backend services.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;

/// Largest request body the gateway buffers before forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// A backend the gateway forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Inventory,
    Orders,
}

impl Upstream {
    /// Label used in logs and metrics.
    pub fn route(&self) -> &'static str {
        match self {
            Upstream::Inventory => "products",
            Upstream::Orders => "orders",
        }
    }
}

/// Shared state: one pooled HTTP client and the backend base URLs.
#[derive(Debug, Clone)]
pub struct GatewayState {
    client: reqwest::Client,
    inventory_url: String,
    order_url: String,
}

impl GatewayState {
    /// Builds the shared client with a fixed timeout and up to 100 idle
    /// connections per backend.
    pub fn new(
        inventory_url: impl Into<String>,
        order_url: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(100)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            inventory_url: inventory_url.into(),
            order_url: order_url.into(),
        })
    }

    fn base_url(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::Inventory => &self.inventory_url,
            Upstream::Orders => &self.order_url,
        }
    }

    /// Maps a gateway path and query to the backend URL.
    ///
    /// `/api/orders/5?x=1` becomes `{order_url}/orders/5?x=1`.
    pub fn target_url(&self, upstream: Upstream, path: &str, query: Option<&str>) -> String {
        let base = self.base_url(upstream).trim_end_matches('/');
        let path = path.strip_prefix("/api").unwrap_or(path);
        match query {
            Some(q) if !q.is_empty() => format!("{base}{path}?{q}"),
            _ => format!("{base}{path}"),
        }
    }
}

/// Handler for `/api/products` and everything below it.
pub async fn inventory(State(state): State<Arc<GatewayState>>, req: Request) -> Response {
    handle(&state, Upstream::Inventory, req).await
}

/// Handler for `/api/orders` and everything below it.
pub async fn orders(State(state): State<Arc<GatewayState>>, req: Request) -> Response {
    handle(&state, Upstream::Orders, req).await
}

async fn handle(state: &GatewayState, upstream: Upstream, req: Request) -> Response {
    let route = upstream.route();
    match forward(state, upstream, req).await {
        Ok(response) => {
            metrics::counter!(
                "gateway_http_requests_total",
                "route" => route,
                "status" => response.status().as_u16().to_string()
            )
            .increment(1);
            response
        }
        Err(e) => {
            tracing::error!(error = %e, detail = ?e, route, "proxy error");
            metrics::counter!(
                "gateway_errors_total",
                "route" => route,
                "error_type" => e.error_type()
            )
            .increment(1);
            let response = e.into_response();
            metrics::counter!(
                "gateway_http_requests_total",
                "route" => route,
                "status" => response.status().as_u16().to_string()
            )
            .increment(1);
            response
        }
    }
}

#[tracing::instrument(skip(state, req), fields(method = %req.method(), path = %req.uri().path()))]
async fn forward(
    state: &GatewayState,
    upstream: Upstream,
    req: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = req.into_parts();
    let url = state.target_url(upstream, parts.uri.path(), parts.uri.query());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    strip_hop_by_hop(&mut headers);

    tracing::debug!(%url, "forwarding request");
    let upstream_response = state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(GatewayError::Unavailable)?;

    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);

    let bytes = upstream_response
        .bytes()
        .await
        .map_err(GatewayError::BadGateway)?;

    Ok((status, headers, Body::from(bytes)).into_response())
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
