//! Order placement commands.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

use super::Quantity;

/// A product and the number of units the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl LineItemRequest {
    /// Creates a line item from an already validated quantity.
    pub fn new(product_id: impl Into<ProductId>, quantity: Quantity) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Creates a line item from raw request values, validating the quantity.
    pub fn parse(product_id: i64, quantity: i64) -> Result<Self, OrderError> {
        Ok(Self {
            product_id: ProductId::new(product_id),
            quantity: Quantity::new(quantity)?,
        })
    }
}

/// Command to place a single-item order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceOrder {
    /// The user placing the order.
    pub user_id: UserId,

    /// The requested product and quantity.
    pub item: LineItemRequest,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder command.
    pub fn new(user_id: UserId, item: LineItemRequest) -> Self {
        Self { user_id, item }
    }

    /// Creates a PlaceOrder command for an anonymous caller.
    pub fn anonymous(item: LineItemRequest) -> Self {
        Self::new(UserId::ANONYMOUS, item)
    }
}

/// Command to place several line items as one all-or-nothing batch.
///
/// Line order is kept for logging and error reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceBulkOrder {
    /// The user placing the orders.
    pub user_id: UserId,

    items: Vec<LineItemRequest>,
}

impl PlaceBulkOrder {
    /// Creates a bulk command, rejecting an empty batch.
    pub fn new(user_id: UserId, items: Vec<LineItemRequest>) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }
        Ok(Self { user_id, items })
    }

    /// Returns the line items in submission order.
    pub fn items(&self) -> &[LineItemRequest] {
        &self.items
    }

    /// Returns the number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; an empty batch cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_item() {
        let item = LineItemRequest::parse(1, 5).unwrap();
        assert_eq!(item.product_id, ProductId::new(1));
        assert_eq!(item.quantity.get(), 5);
    }

    #[test]
    fn test_parse_rejects_non_positive_quantity() {
        assert_eq!(
            LineItemRequest::parse(1, 0),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        );
        assert!(LineItemRequest::parse(1, -2).is_err());
    }

    #[test]
    fn test_anonymous_order_uses_user_zero() {
        let cmd = PlaceOrder::anonymous(LineItemRequest::parse(2, 1).unwrap());
        assert_eq!(cmd.user_id, UserId::ANONYMOUS);
    }

    #[test]
    fn test_bulk_order_requires_items() {
        assert_eq!(
            PlaceBulkOrder::new(UserId::new(1), vec![]),
            Err(OrderError::NoItems)
        );
    }

    #[test]
    fn test_bulk_order_keeps_submission_order() {
        let items = vec![
            LineItemRequest::parse(2, 1).unwrap(),
            LineItemRequest::parse(1, 3).unwrap(),
        ];
        let cmd = PlaceBulkOrder::new(UserId::new(1), items.clone()).unwrap();
        assert_eq!(cmd.items(), items.as_slice());
        assert_eq!(cmd.len(), 2);
        assert!(!cmd.is_empty());
    }
}
