//! Order fulfillment workflows.
//!
//! Two entry points share one three-phase shape:
//! 1. Validate: fetch a fresh product snapshot and check stock for each line
//! 2. Persist: commit the order rows locally (one transaction for a batch)
//! 3. External: write the decremented stock back and publish `order_created`
//!
//! Phases 1 and 2 decide the outcome. Phase 3 runs after the commit on a
//! detached task and its failures are logged, never compensated.

pub mod coordinator;
pub mod error;
pub mod services;
pub mod side_effects;
pub mod state;

pub use coordinator::FulfillmentService;
pub use error::{ErrorKind, FulfillmentError, InventoryError, PublishError, Result};
pub use services::{
    EventPublisher, HttpInventoryClient, InMemoryEventPublisher, InMemoryInventoryClient,
    InventoryClient, KafkaEventPublisher, UpdateBehavior,
};
pub use side_effects::{InFlight, Placed, SideEffectOutcome, SideEffectReport, SideEffects};
pub use state::WorkflowState;
