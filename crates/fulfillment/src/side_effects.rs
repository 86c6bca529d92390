//! The external phase: stock write-back and event emission after commit.
//!
//! Runs as a detached task once orders are durable. Each order's stock update
//! and event are attempted exactly once; failures are logged and counted and
//! never touch the committed rows. There is no compensation and no retry, so
//! a failed decrement leaves the remote ledger diverged from the order table.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::OrderId;
use domain::{Order, OrderEvent, ValidatedItem};
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};

use crate::services::{EventPublisher, InventoryClient};
use crate::state::{StateTracker, WorkflowState};

/// What happened to one committed order's side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffectOutcome {
    pub order_id: OrderId,
    pub stock_updated: bool,
    pub event_published: bool,
}

/// Outcomes for every order of one invocation, in commit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffectReport {
    pub outcomes: Vec<SideEffectOutcome>,
}

impl SideEffectReport {
    /// Returns true if every stock update and event went through.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.stock_updated && o.event_published)
    }

    /// Returns the outcome for an order.
    pub fn outcome(&self, order_id: OrderId) -> Option<&SideEffectOutcome> {
        self.outcomes.iter().find(|o| o.order_id == order_id)
    }
}

/// Handle to a dispatched external phase.
///
/// Dropping it (or calling [`detach`](Self::detach)) leaves the task running.
#[derive(Debug)]
pub struct SideEffects {
    handle: JoinHandle<SideEffectReport>,
}

impl SideEffects {
    /// Waits for the external phase to finish.
    pub async fn wait(self) -> Result<SideEffectReport, JoinError> {
        self.handle.await
    }

    /// Lets the external phase finish in the background.
    pub fn detach(self) {
        drop(self.handle);
    }
}

/// Committed orders together with their in-flight side effects.
#[derive(Debug)]
pub struct Placed<T> {
    /// The rows as persisted by the store.
    pub committed: T,
    /// The external phase dispatched after the commit.
    pub side_effects: SideEffects,
}

/// Counts external phases that are still running.
///
/// Clones share one counter. The runtime drops unfinished tasks when it shuts
/// down, so a process exiting without [`drained`](Self::drained) may cut a
/// stock update off mid-request.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<InFlightInner>,
}

#[derive(Debug, Default)]
struct InFlightInner {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    /// Returns the number of external phases still running.
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    /// Resolves once no external phase is running.
    pub async fn drained(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn enter(&self) -> InFlightGuard {
        self.inner.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            inner: self.inner.clone(),
        }
    }
}

struct InFlightGuard {
    inner: Arc<InFlightInner>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.inner.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Spawns the external phase for a set of committed orders.
pub(crate) fn dispatch<I, P>(
    inventory: Arc<I>,
    publisher: Arc<P>,
    in_flight: &InFlight,
    tracker: StateTracker,
    committed: Vec<(Order, ValidatedItem)>,
) -> SideEffects
where
    I: InventoryClient + 'static,
    P: EventPublisher + 'static,
{
    let guard = in_flight.enter();
    let handle = tokio::spawn(async move {
        let report = run(inventory, publisher, tracker, committed).await;
        drop(guard);
        report
    });
    SideEffects { handle }
}

async fn run<I, P>(
    inventory: Arc<I>,
    publisher: Arc<P>,
    mut tracker: StateTracker,
    committed: Vec<(Order, ValidatedItem)>,
) -> SideEffectReport
where
    I: InventoryClient,
    P: EventPublisher,
{
    let mut report = SideEffectReport::default();

    for (order, item) in committed {
        tracker.enter(WorkflowState::InventoryUpdating);
        let new_stock = item.remaining_stock();
        let stock_updated = match inventory
            .update_stock(order.product_id, item.snapshot(), new_stock)
            .await
        {
            Ok(()) => {
                tracing::debug!(order_id = %order.id, product_id = %order.product_id, new_stock, "stock updated");
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    order_id = %order.id,
                    product_id = %order.product_id,
                    new_stock,
                    "failed to update inventory; order stays confirmed"
                );
                metrics::counter!("order_side_effect_failures_total", "kind" => "stock_update")
                    .increment(1);
                false
            }
        };

        tracker.enter(WorkflowState::EventPublishing);
        let event_published = publisher.publish(&OrderEvent::order_created(&order)).await;
        if !event_published {
            metrics::counter!("order_side_effect_failures_total", "kind" => "event_publish")
                .increment(1);
        }

        report.outcomes.push(SideEffectOutcome {
            order_id: order.id,
            stock_updated,
            event_published,
        });
    }

    tracker.enter(WorkflowState::Completed);
    tracing::debug!(
        state = %tracker.state(),
        orders = report.outcomes.len(),
        all_succeeded = report.all_succeeded(),
        "external phase finished"
    );
    report
}
