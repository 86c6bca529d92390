//! Order placement and read endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ProductId, UserId};
use domain::{LineItemRequest, Order, PlaceBulkOrder, PlaceOrder};
use fulfillment::{EventPublisher, FulfillmentError, FulfillmentService, InventoryClient};
use order_store::OrderStore;
use serde::Deserialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, I, P>
where
    S: OrderStore,
    I: InventoryClient,
    P: EventPublisher,
{
    pub fulfillment: FulfillmentService<S, I, P>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BulkOrderRequest {
    #[serde(default)]
    pub user_id: i64,
    pub items: Vec<LineItemBody>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemBody {
    pub product_id: i64,
    pub quantity: i64,
}

impl BulkOrderRequest {
    fn into_command(self) -> Result<PlaceBulkOrder, ApiError> {
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(line, item)| {
                LineItemRequest::parse(item.product_id, item.quantity).map_err(|e| {
                    FulfillmentError::LineItemRejected {
                        line,
                        product_id: ProductId::new(item.product_id),
                        source: Box::new(e.into()),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        PlaceBulkOrder::new(UserId::new(self.user_id), items)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

// -- Handlers --

/// POST /orders: place a single-item order.
///
/// The workflow runs on its own task so a client disconnect cannot cut it
/// short. The response is sent once the order is committed; stock update and
/// event publication continue in the background.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let item = LineItemRequest::parse(req.product_id, req.quantity)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let cmd = PlaceOrder::new(UserId::new(req.user_id), item);

    let placed = tokio::spawn(async move { state.fulfillment.place_order(cmd).await })
        .await
        .map_err(|e| ApiError::Internal(format!("order workflow aborted: {e}")))??;
    placed.side_effects.detach();

    Ok((StatusCode::CREATED, Json(placed.committed)))
}

/// POST /orders/bulk: place several line items as one batch.
#[tracing::instrument(skip(state, payload))]
pub async fn create_bulk<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    payload: Result<Json<BulkOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Order>>), ApiError>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let cmd = req.into_command()?;

    let placed = tokio::spawn(async move { state.fulfillment.place_bulk_order(cmd).await })
        .await
        .map_err(|e| ApiError::Internal(format!("bulk order workflow aborted: {e}")))??;
    placed.side_effects.detach();

    Ok((StatusCode::CREATED, Json(placed.committed)))
}

/// GET /orders: list all orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let orders = state.fulfillment.store().list_orders().await?;
    Ok(Json(orders))
}

/// GET /orders/{id}: load one order.
#[tracing::instrument(skip(state))]
pub async fn get<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    state
        .fulfillment
        .store()
        .get_order(OrderId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))
}

/// GET /orders/user/{user_id}: list a user's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<S, I, P>(
    State(state): State<Arc<AppState<S, I, P>>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderStore + 'static,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let orders = state
        .fulfillment
        .store()
        .list_orders_for_user(UserId::new(user_id))
        .await?;
    Ok(Json(orders))
}
