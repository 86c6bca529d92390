//! The persisted order record.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderStatus, Quantity};

/// An order row as committed by the order store.
///
/// `id` and `created_at` are assigned by the store. Within the fulfillment
/// workflow an order is never modified after it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// The fields of an order before the store has assigned an id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub total_price: Money,
    pub status: OrderStatus,
}

impl NewOrder {
    /// Completes the record with store-assigned values.
    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            product_id: self.product_id,
            quantity: self.quantity,
            total_price: self.total_price,
            status: self.status,
            created_at,
        }
    }
}
