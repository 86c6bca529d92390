use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{NewOrder, Order};

use crate::Result;

/// Core trait for order store implementations.
///
/// The store assigns order ids and creation timestamps. All implementations
/// must be thread-safe (Send + Sync); one instance is shared by every
/// request worker.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a single order row and returns it as persisted.
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    /// Inserts all rows inside one local transaction.
    ///
    /// Either every row is committed or none is: any failure rolls the whole
    /// batch back. Rows are returned in input order.
    async fn create_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>>;

    /// Retrieves an order by id.
    ///
    /// Returns None if no such order exists.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Retrieves every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Retrieves the orders owned by a user, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Checks the store is reachable.
    async fn ping(&self) -> Result<()>;
}
