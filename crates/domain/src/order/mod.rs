//! Orders, their commands and lifecycle events.

mod commands;
mod events;
mod model;
mod state;
mod value_objects;

pub use commands::{LineItemRequest, PlaceBulkOrder, PlaceOrder};
pub use events::{OrderCreatedData, OrderEvent};
pub use model::{NewOrder, Order};
pub use state::OrderStatus;
pub use value_objects::{Money, Quantity};
