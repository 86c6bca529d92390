//! Domain types for the order fulfillment workflow.
//!
//! This crate is pure: it holds the order record, the point-in-time product
//! snapshot a workflow validates against, fixed-point money and the lifecycle
//! events published after an order is committed. All I/O lives in the
//! `order-store` and `fulfillment` crates.

pub mod error;
pub mod order;
pub mod product;

pub use common::{OrderId, ProductId, UserId};
pub use error::OrderError;
pub use order::{
    LineItemRequest, Money, NewOrder, Order, OrderCreatedData, OrderEvent, OrderStatus,
    PlaceBulkOrder, PlaceOrder, Quantity,
};
pub use product::{ProductSnapshot, ValidatedItem};
