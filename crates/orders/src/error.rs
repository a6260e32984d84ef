use common::OrderId;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order exists with the given ID.
    #[error("Order not found with ID: {0}")]
    NotFound(OrderId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain value.
    #[error("Stored order could not be decoded: {0}")]
    Decode(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
