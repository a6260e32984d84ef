use common::OrderId;
use orders::OrderStatus;
use thiserror::Error;

/// Errors surfaced to callers of the orchestrator.
///
/// Gateway transport failures never appear here as their own variant; they
/// are reclassified at the orchestrator boundary into `Validation` (during
/// item validation) or `Internal` (during reservation).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request was rejected before any state changed.
    #[error("{0}")]
    Validation(String),

    /// No order exists with the given ID.
    #[error("Order not found with ID: {0}")]
    OrderNotFound(OrderId),

    /// The order's status forbids updates.
    #[error("Cannot update order with status: {0}")]
    CannotUpdate(OrderStatus),

    /// The order's status forbids deletion.
    #[error("Can only delete orders with PENDING or CANCELLED status")]
    CannotDelete(OrderStatus),

    /// The requested status change is not allowed.
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The workflow failed after validation passed; any reservations
    /// acquired along the way have been compensated best-effort.
    #[error("{0}")]
    Internal(String),

    /// An order store error occurred.
    #[error("Storage error: {0}")]
    Store(#[from] orders::StoreError),
}

impl OrchestratorError {
    /// Returns the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            OrchestratorError::Validation(_) => "ERR_003",
            OrchestratorError::OrderNotFound(_) => "ORD_001",
            OrchestratorError::CannotUpdate(_) => "ORD_003",
            OrchestratorError::CannotDelete(_) => "ORD_004",
            OrchestratorError::InvalidTransition { .. } => "ORD_005",
            OrchestratorError::Internal(_) | OrchestratorError::Store(_) => "ERR_005",
        }
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
