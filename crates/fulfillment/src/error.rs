//! Fulfillment error types.

use common::ProductId;
use domain::OrderError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors returned by an [`InventoryClient`](crate::InventoryClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The inventory service reports no such product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The inventory service could not be reached, timed out, or answered
    /// with an unexpected status or payload.
    #[error("Inventory service unavailable: {0}")]
    Unavailable(String),

    /// A stock update was refused or never reached the inventory service.
    /// `body` carries the response body or the transport error.
    #[error("Stock update for product {product_id} failed: {body}")]
    UpdateFailed { product_id: ProductId, body: String },
}

/// Errors returned by an [`EventPublisher`](crate::EventPublisher).
///
/// Never propagated out of a workflow; publish failures are logged and
/// counted only.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The Kafka producer failed to deliver the message.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The bus rejected the event.
    #[error("Event bus rejected event: {0}")]
    Rejected(String),
}

/// How a workflow failure should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request shape or insufficient stock.
    Validation,
    /// The inventory service failed during validation: unreachable, timed
    /// out, or answered with a non-success status (including 404).
    UpstreamUnavailable,
    /// The local order store failed; nothing was committed.
    Persistence,
}

/// Errors that reject a workflow invocation.
///
/// Only validation and persistence failures appear here. Failures after the
/// commit are never returned.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The request failed a domain rule.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The inventory service failed during validation.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// The order store failed to commit.
    #[error("Order store error: {0}")]
    Store(#[from] OrderStoreError),

    /// A line of a bulk order failed validation; the whole batch was rejected.
    #[error("Line {line} (product {product_id}) rejected: {source}")]
    LineItemRejected {
        line: usize,
        product_id: ProductId,
        #[source]
        source: Box<FulfillmentError>,
    },
}

impl FulfillmentError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::Order(_) => ErrorKind::Validation,
            FulfillmentError::Inventory(_) => ErrorKind::UpstreamUnavailable,
            FulfillmentError::Store(_) => ErrorKind::Persistence,
            FulfillmentError::LineItemRejected { source, .. } => source.kind(),
        }
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
