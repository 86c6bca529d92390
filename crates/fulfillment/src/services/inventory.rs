//! Inventory service client trait, HTTP implementation and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use domain::{Money, ProductSnapshot};
use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::InventoryError;

/// Accessor for the remote product/stock ledger.
///
/// Every call is a single attempt. There is no caching, no retry and no
/// idempotency key: repeating an `update_stock` call after an ambiguous
/// failure can apply the decrement twice.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Reads the current state of a product.
    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductSnapshot, InventoryError>;

    /// Overwrites a product's stock level, carrying the other fields over
    /// from `snapshot`.
    async fn update_stock(
        &self,
        product_id: ProductId,
        snapshot: &ProductSnapshot,
        new_stock: i64,
    ) -> Result<(), InventoryError>;
}

/// Body of `PUT /products/{id}`.
#[derive(Debug, Serialize)]
struct ProductUpdate<'a> {
    name: &'a str,
    description: &'a str,
    price: Money,
    stock: i64,
}

/// Inventory client speaking the inventory service's REST API.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Creates a client with a fixed per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn product_url(&self, product_id: ProductId) -> String {
        format!(
            "{}/products/{}",
            self.base_url.trim_end_matches('/'),
            product_id
        )
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductSnapshot, InventoryError> {
        let resp = self
            .http
            .get(self.product_url(product_id))
            .send()
            .await
            .map_err(|e| InventoryError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(InventoryError::NotFound(product_id)),
            status => {
                return Err(InventoryError::Unavailable(format!(
                    "unexpected status {} fetching product {}",
                    status.as_u16(),
                    product_id
                )));
            }
        }

        resp.json::<ProductSnapshot>().await.map_err(|e| {
            InventoryError::Unavailable(format!("invalid product payload for {product_id}: {e}"))
        })
    }

    #[tracing::instrument(skip(self, snapshot))]
    async fn update_stock(
        &self,
        product_id: ProductId,
        snapshot: &ProductSnapshot,
        new_stock: i64,
    ) -> Result<(), InventoryError> {
        let body = ProductUpdate {
            name: &snapshot.name,
            description: &snapshot.description,
            price: snapshot.price,
            stock: new_stock,
        };

        let resp = self
            .http
            .put(self.product_url(product_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| InventoryError::UpdateFailed {
                product_id,
                body: e.to_string(),
            })?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            tracing::debug!(status = status.as_u16(), "stock update refused");
            return Err(InventoryError::UpdateFailed { product_id, body });
        }

        Ok(())
    }
}

/// How the in-memory client answers `update_stock`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UpdateBehavior {
    /// Write the new stock level.
    #[default]
    Apply,
    /// Refuse with the given response body.
    Reject(String),
    /// Behave as if the service cannot be reached.
    Unreachable,
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    products: HashMap<ProductId, ProductSnapshot>,
    unavailable: bool,
    update_behavior: UpdateBehavior,
    fetches: usize,
    updates: Vec<(ProductId, i64)>,
}

/// In-memory inventory client for testing.
///
/// Stock updates overwrite the level exactly like the remote `PUT` does, so
/// two workflows validated against the same snapshot both write
/// `snapshot.stock - quantity`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryClient {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryClient {
    /// Creates an empty in-memory inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub async fn put_product(&self, product: ProductSnapshot) {
        self.state
            .write()
            .await
            .products
            .insert(product.id, product);
    }

    /// Makes every call fail as unreachable while set.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Configures how `update_stock` answers.
    pub async fn set_update_behavior(&self, behavior: UpdateBehavior) {
        self.state.write().await.update_behavior = behavior;
    }

    /// Returns the current stock of a product.
    pub async fn stock_of(&self, product_id: ProductId) -> Option<i64> {
        self.state
            .read()
            .await
            .products
            .get(&product_id)
            .map(|p| p.stock)
    }

    /// Returns the number of `fetch_product` calls received.
    pub async fn fetch_count(&self) -> usize {
        self.state.read().await.fetches
    }

    /// Returns the stock writes applied, in order.
    pub async fn updates(&self) -> Vec<(ProductId, i64)> {
        self.state.read().await.updates.clone()
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventoryClient {
    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductSnapshot, InventoryError> {
        let mut state = self.state.write().await;
        state.fetches += 1;

        if state.unavailable {
            return Err(InventoryError::Unavailable("connection refused".to_string()));
        }

        state
            .products
            .get(&product_id)
            .cloned()
            .ok_or(InventoryError::NotFound(product_id))
    }

    async fn update_stock(
        &self,
        product_id: ProductId,
        _snapshot: &ProductSnapshot,
        new_stock: i64,
    ) -> Result<(), InventoryError> {
        let mut state = self.state.write().await;

        let unreachable = InventoryError::UpdateFailed {
            product_id,
            body: "connection refused".to_string(),
        };
        if state.unavailable {
            return Err(unreachable);
        }
        match &state.update_behavior {
            UpdateBehavior::Apply => {}
            UpdateBehavior::Reject(body) => {
                return Err(InventoryError::UpdateFailed {
                    product_id,
                    body: body.clone(),
                });
            }
            UpdateBehavior::Unreachable => return Err(unreachable),
        }

        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| InventoryError::UpdateFailed {
                product_id,
                body: "Product not found".to_string(),
            })?;
        product.stock = new_stock;
        state.updates.push((product_id, new_stock));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: i64, stock: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: "Widget".to_string(),
            description: String::new(),
            price: Money::from_dollars(100),
            stock,
        }
    }

    #[tokio::test]
    async fn test_fetch_known_and_unknown_products() {
        let inventory = InMemoryInventoryClient::new();
        inventory.put_product(widget(1, 50)).await;

        let snapshot = inventory.fetch_product(ProductId::new(1)).await.unwrap();
        assert_eq!(snapshot.stock, 50);

        let err = inventory.fetch_product(ProductId::new(2)).await.unwrap_err();
        assert_eq!(err, InventoryError::NotFound(ProductId::new(2)));
        assert_eq!(inventory.fetch_count().await, 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_stock() {
        let inventory = InMemoryInventoryClient::new();
        let product = widget(1, 50);
        inventory.put_product(product.clone()).await;

        inventory
            .update_stock(ProductId::new(1), &product, 45)
            .await
            .unwrap();

        assert_eq!(inventory.stock_of(ProductId::new(1)).await, Some(45));
        assert_eq!(inventory.updates().await, vec![(ProductId::new(1), 45)]);
    }

    #[tokio::test]
    async fn test_update_behaviors() {
        let inventory = InMemoryInventoryClient::new();
        let product = widget(1, 50);
        inventory.put_product(product.clone()).await;

        inventory
            .set_update_behavior(UpdateBehavior::Reject("Invalid stock".to_string()))
            .await;
        let err = inventory
            .update_stock(ProductId::new(1), &product, 45)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InventoryError::UpdateFailed {
                product_id: ProductId::new(1),
                body: "Invalid stock".to_string(),
            }
        );

        inventory
            .set_update_behavior(UpdateBehavior::Unreachable)
            .await;
        assert!(matches!(
            inventory.update_stock(ProductId::new(1), &product, 45).await,
            Err(InventoryError::Unavailable(_))
        ));
        assert_eq!(inventory.stock_of(ProductId::new(1)).await, Some(50));
    }

    #[tokio::test]
    async fn test_unavailable_inventory_fails_fetch() {
        let inventory = InMemoryInventoryClient::new();
        inventory.put_product(widget(1, 50)).await;
        inventory.set_unavailable(true).await;

        assert!(matches!(
            inventory.fetch_product(ProductId::new(1)).await,
            Err(InventoryError::Unavailable(_))
        ));
    }

    #[test]
    fn test_product_url_joins_cleanly() {
        let client = HttpInventoryClient::with_client(reqwest::Client::new(), "http://inv:8081/");
        assert_eq!(
            client.product_url(ProductId::new(7)),
            "http://inv:8081/products/7"
        );
    }
}
