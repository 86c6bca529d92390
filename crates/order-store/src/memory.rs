use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, UserId};
use domain::{NewOrder, Order};
use tokio::sync::RwLock;

use crate::{OrderStoreError, Result, store::OrderStore};

#[derive(Default)]
struct InMemoryState {
    orders: Vec<Order>,
    next_id: i64,
    fail_on_insert: bool,
    fail_batch_at: Option<usize>,
    unavailable: bool,
}

impl InMemoryState {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(OrderStoreError::Unavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn check_insert(&self) -> Result<()> {
        self.check_available()?;
        if self.fail_on_insert {
            return Err(OrderStoreError::Unavailable("insert failed".to_string()));
        }
        Ok(())
    }

    fn persist(&mut self, order: NewOrder) -> Order {
        self.next_id += 1;
        let order = order.into_order(OrderId::new(self.next_id), Utc::now());
        self.orders.push(order.clone());
        order
    }

    fn newest_first<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<Order> {
        let mut orders: Vec<Order> = orders.cloned().collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        orders
    }
}

/// In-memory order store for testing.
///
/// Provides the same interface and batch atomicity as the PostgreSQL
/// implementation, plus switches to simulate failures.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every insert fail while set.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Makes batch inserts fail when they reach the given line (zero-based),
    /// after the earlier lines of the batch have been written.
    pub async fn set_fail_batch_at(&self, line: Option<usize>) {
        self.state.write().await.fail_batch_at = line;
    }

    /// Makes every operation, including `ping`, fail while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns all stored orders in insertion order.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let mut state = self.state.write().await;
        state.check_insert()?;
        Ok(state.persist(order))
    }

    async fn create_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>> {
        let mut state = self.state.write().await;
        state.check_insert()?;

        // Write under the lock, then roll back on a simulated mid-batch failure.
        let rollback_len = state.orders.len();
        let rollback_id = state.next_id;

        let mut created = Vec::with_capacity(orders.len());
        for (line, order) in orders.into_iter().enumerate() {
            if state.fail_batch_at == Some(line) {
                state.orders.truncate(rollback_len);
                state.next_id = rollback_id;
                return Err(OrderStoreError::Unavailable(format!(
                    "insert failed at line {line}"
                )));
            }
            created.push(state.persist(order));
        }

        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(InMemoryState::newest_first(state.orders.iter()))
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        state.check_available()?;
        Ok(InMemoryState::newest_first(
            state.orders.iter().filter(|o| o.user_id == user_id),
        ))
    }

    async fn ping(&self) -> Result<()> {
        self.state.read().await.check_available()
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;
    use domain::{Money, OrderStatus, Quantity};

    use super::*;

    fn new_order(user: i64, product: i64, quantity: i64) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            product_id: ProductId::new(product),
            quantity: Quantity::new(quantity).unwrap(),
            total_price: Money::from_cents(quantity * 1000),
            status: OrderStatus::Confirmed,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryOrderStore::new();
        let first = store.create_order(new_order(1, 1, 1)).await.unwrap();
        let second = store.create_order(new_order(1, 2, 1)).await.unwrap();

        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
        assert_eq!(store.order_count().await, 2);
    }

    #[tokio::test]
    async fn test_failed_insert_creates_nothing() {
        let store = InMemoryOrderStore::new();
        store.set_fail_on_insert(true).await;

        assert!(store.create_order(new_order(1, 1, 1)).await.is_err());
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_batch_failure_rolls_back_earlier_lines() {
        let store = InMemoryOrderStore::new();
        store.create_order(new_order(1, 9, 1)).await.unwrap();
        store.set_fail_batch_at(Some(2)).await;

        let result = store
            .create_orders(vec![new_order(1, 1, 1), new_order(1, 2, 1), new_order(1, 3, 1)])
            .await;

        assert!(result.is_err());
        assert_eq!(store.order_count().await, 1);

        // Ids are not burned by the rolled back batch.
        store.set_fail_batch_at(None).await;
        let next = store.create_order(new_order(1, 4, 1)).await.unwrap();
        assert_eq!(next.id, OrderId::new(2));
    }

    #[tokio::test]
    async fn test_batch_returns_rows_in_input_order() {
        let store = InMemoryOrderStore::new();
        let created = store
            .create_orders(vec![new_order(1, 5, 1), new_order(1, 6, 2)])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].product_id, ProductId::new(5));
        assert_eq!(created[1].product_id, ProductId::new(6));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_filters_by_user() {
        let store = InMemoryOrderStore::new();
        store.create_order(new_order(1, 1, 1)).await.unwrap();
        store.create_order(new_order(2, 1, 1)).await.unwrap();
        store.create_order(new_order(1, 2, 1)).await.unwrap();

        let all = store.list_orders().await.unwrap();
        assert_eq!(
            all.iter().map(|o| o.id.as_i64()).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );

        let mine = store.list_orders_for_user(UserId::new(1)).await.unwrap();
        assert_eq!(
            mine.iter().map(|o| o.id.as_i64()).collect::<Vec<_>>(),
            vec![3, 1]
        );
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_ping_and_reads() {
        let store = InMemoryOrderStore::new();
        assert!(store.ping().await.is_ok());

        store.set_unavailable(true).await;
        assert!(store.ping().await.is_err());
        assert!(store.get_order(OrderId::new(1)).await.is_err());
    }
}
