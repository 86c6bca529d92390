use domain::OrderError;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to an order.
    #[error("Corrupt order row {id}: {source}")]
    CorruptRow {
        id: i64,
        #[source]
        source: OrderError,
    },

    /// The store refused the operation (used by the in-memory store's fault injection).
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
