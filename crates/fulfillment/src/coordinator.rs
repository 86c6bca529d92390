//! Fulfillment service orchestrating the single-item and bulk workflows.

use std::sync::Arc;
use std::time::Instant;

use domain::{LineItemRequest, Order, PlaceBulkOrder, PlaceOrder, ValidatedItem};
use order_store::OrderStore;

use crate::error::{FulfillmentError, Result};
use crate::services::{EventPublisher, InventoryClient};
use crate::side_effects::{self, InFlight, Placed};
use crate::state::{StateTracker, WorkflowState};

/// Orchestrates order placement across the inventory service, the order
/// store and the event bus.
///
/// Constructed once at startup and shared by every request worker. All
/// steps of one invocation run in sequence; nothing is locked across
/// invocations, so concurrent orders for the same product may all pass the
/// stock check against the same snapshot.
pub struct FulfillmentService<S, I, P>
where
    S: OrderStore,
    I: InventoryClient,
    P: EventPublisher,
{
    store: S,
    inventory: Arc<I>,
    publisher: Arc<P>,
    in_flight: InFlight,
}

impl<S, I, P> FulfillmentService<S, I, P>
where
    S: OrderStore,
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    /// Creates a new fulfillment service.
    pub fn new(store: S, inventory: I, publisher: P) -> Self {
        Self {
            store,
            inventory: Arc::new(inventory),
            publisher: Arc::new(publisher),
            in_flight: InFlight::default(),
        }
    }

    /// Returns the order store the service persists through.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tracks the external phases dispatched by this service.
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Places a single-item order.
    ///
    /// Fetches a fresh snapshot, checks stock, and commits one `confirmed`
    /// row priced at the snapshot's unit price. The result depends only on
    /// those steps. The stock decrement and `order_created` event are then
    /// dispatched in the background and can fail without affecting the
    /// returned order.
    #[tracing::instrument(skip(self), fields(user_id = %cmd.user_id, product_id = %cmd.item.product_id, quantity = %cmd.item.quantity))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Placed<Order>> {
        let started = Instant::now();
        let mut tracker = StateTracker::new();

        tracker.enter(WorkflowState::Validating);
        let item = match self.validate(cmd.item).await {
            Ok(item) => item,
            Err(e) => return Err(reject(&mut tracker, e, started)),
        };

        tracker.enter(WorkflowState::Persisting);
        let order = match self.store.create_order(item.to_new_order(cmd.user_id)).await {
            Ok(order) => order,
            Err(e) => return Err(reject(&mut tracker, e.into(), started)),
        };

        tracing::info!(
            order_id = %order.id,
            total_price = %order.total_price,
            "order confirmed"
        );
        record_confirmed(1, started);

        let side_effects = side_effects::dispatch(
            self.inventory.clone(),
            self.publisher.clone(),
            &self.in_flight,
            tracker,
            vec![(order.clone(), item)],
        );

        Ok(Placed {
            committed: order,
            side_effects,
        })
    }

    /// Places several line items as one batch.
    ///
    /// Every line is validated in order before anything is written; the first
    /// failing line rejects the whole batch. The rows are then inserted in one
    /// local transaction, so either all lines become orders or none do. After
    /// the commit each order's stock update and event are attempted
    /// independently, with no compensation if they fail.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id, lines = cmd.len()))]
    pub async fn place_bulk_order(&self, cmd: PlaceBulkOrder) -> Result<Placed<Vec<Order>>> {
        let started = Instant::now();
        let mut tracker = StateTracker::new();

        tracker.enter(WorkflowState::Validating);
        let mut validated = Vec::with_capacity(cmd.len());
        for (line, request) in cmd.items().iter().enumerate() {
            match self.validate(*request).await {
                Ok(item) => validated.push(item),
                Err(source) => {
                    let err = FulfillmentError::LineItemRejected {
                        line,
                        product_id: request.product_id,
                        source: Box::new(source),
                    };
                    return Err(reject(&mut tracker, err, started));
                }
            }
        }

        tracker.enter(WorkflowState::Persisting);
        let rows = validated
            .iter()
            .map(|item| item.to_new_order(cmd.user_id))
            .collect();
        let orders = match self.store.create_orders(rows).await {
            Ok(orders) => orders,
            Err(e) => return Err(reject(&mut tracker, e.into(), started)),
        };

        tracing::info!(count = orders.len(), "bulk order committed");
        record_confirmed(orders.len() as u64, started);

        let side_effects = side_effects::dispatch(
            self.inventory.clone(),
            self.publisher.clone(),
            &self.in_flight,
            tracker,
            orders.iter().cloned().zip(validated).collect(),
        );

        Ok(Placed {
            committed: orders,
            side_effects,
        })
    }

    async fn validate(&self, request: LineItemRequest) -> Result<ValidatedItem> {
        let snapshot = self.inventory.fetch_product(request.product_id).await?;
        Ok(snapshot.reserve_for(request)?)
    }
}

fn reject(tracker: &mut StateTracker, err: FulfillmentError, started: Instant) -> FulfillmentError {
    tracker.enter(WorkflowState::Rejected);
    tracing::warn!(error = %err, kind = ?err.kind(), "order rejected");
    metrics::counter!("orders_total", "status" => "rejected").increment(1);
    metrics::histogram!("order_processing_duration_seconds")
        .record(started.elapsed().as_secs_f64());
    err
}

fn record_confirmed(count: u64, started: Instant) {
    metrics::counter!("orders_total", "status" => "confirmed").increment(count);
    metrics::histogram!("order_processing_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}
