//! Domain error types.

use common::ProductId;
use thiserror::Error;

/// Errors raised while shaping or validating an order request.
///
/// Every variant is a client error: the request is rejected before anything
/// is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Quantity is zero, negative or too large to store.
    #[error("Invalid quantity: {quantity} (must be between 1 and {max})", max = i32::MAX)]
    InvalidQuantity { quantity: i64 },

    /// A bulk order was submitted without line items.
    #[error("Order has no items")]
    NoItems,

    /// The remote inventory reports fewer units than requested.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i64,
    },

    /// The total price exceeds what an order can record.
    #[error("Total price overflow for product {product_id}")]
    PriceOverflow { product_id: ProductId },

    /// A status string read back from storage is not recognised.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
