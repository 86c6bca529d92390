//! Point-in-time product state fetched from the inventory service.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::order::{LineItemRequest, Money, NewOrder, OrderStatus};

/// A copy of a product as the inventory service reported it.
///
/// Snapshots are fetched fresh for every workflow invocation and never
/// cached. By the time a snapshot is acted on the remote ledger may have
/// moved; nothing here guards against that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub stock: i64,
}

impl ProductSnapshot {
    /// Checks the snapshot can cover the request and pairs the two.
    pub fn reserve_for(self, request: LineItemRequest) -> Result<ValidatedItem, OrderError> {
        let requested = request.quantity.get();
        if self.stock < i64::from(requested) {
            return Err(OrderError::InsufficientStock {
                product_id: request.product_id,
                requested,
                available: self.stock,
            });
        }
        let total_price = self
            .price
            .checked_multiply(request.quantity)
            .filter(|total| *total <= Money::MAX_ORDER_TOTAL)
            .ok_or(OrderError::PriceOverflow {
                product_id: request.product_id,
            })?;

        Ok(ValidatedItem {
            request,
            snapshot: self,
            total_price,
        })
    }
}

/// A line item that passed the stock check, with the snapshot it was checked
/// against. Lives only for one workflow invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedItem {
    request: LineItemRequest,
    snapshot: ProductSnapshot,
    total_price: Money,
}

impl ValidatedItem {
    pub fn request(&self) -> &LineItemRequest {
        &self.request
    }

    pub fn snapshot(&self) -> &ProductSnapshot {
        &self.snapshot
    }

    /// Unit price observed at validation time times the quantity.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// The stock level to write back once the order is committed.
    ///
    /// Derived from the validation snapshot, not a fresh read.
    pub fn remaining_stock(&self) -> i64 {
        self.snapshot.stock - i64::from(self.request.quantity.get())
    }

    /// Builds the confirmed order row for this item.
    pub fn to_new_order(&self, user_id: UserId) -> NewOrder {
        NewOrder {
            user_id,
            product_id: self.request.product_id,
            quantity: self.request.quantity,
            total_price: self.total_price,
            status: OrderStatus::Confirmed,
        }
    }
}
