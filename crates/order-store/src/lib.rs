//! Durable, transactional storage of order rows.
//!
//! [`OrderStore`] is the seam the fulfillment workflows persist through.
//! [`PostgresOrderStore`] is the production implementation; [`InMemoryOrderStore`]
//! mirrors its semantics for tests and can be told to fail.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
