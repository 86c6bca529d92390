//! Collaborators the workflows call out to: the remote inventory and the event bus.

pub mod inventory;
pub mod publisher;

pub use inventory::{HttpInventoryClient, InMemoryInventoryClient, InventoryClient, UpdateBehavior};
pub use publisher::{EventPublisher, InMemoryEventPublisher, KafkaEventPublisher};
