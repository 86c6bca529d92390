//! Order lifecycle events published to the shared bus.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

use super::{Money, Order, Quantity};

/// Events emitted after an order has been committed.
///
/// Serialized with the variant name in an `event_type` field next to the
/// variant's own fields, e.g.
/// `{"event_type":"order_created","order_id":1,...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// An order row was committed.
    OrderCreated(OrderCreatedData),
}

impl OrderEvent {
    /// Builds an `order_created` event for a persisted order, stamped now.
    pub fn order_created(order: &Order) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            order_id: order.id,
            product_id: order.product_id,
            quantity: order.quantity,
            total_price: order.total_price,
            timestamp: Utc::now(),
        })
    }

    /// Returns the wire name of the event.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "order_created",
        }
    }

    /// Returns the order the event is about.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::OrderCreated(data) => data.order_id,
        }
    }
}

/// Data for the `order_created` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub total_price: Money,

    /// Emission time, as Unix seconds on the wire.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}
