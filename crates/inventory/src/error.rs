use common::{InventoryId, ProductId, WarehouseId};
use thiserror::Error;

/// Errors that can occur when interacting with the inventory stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record's row version did not match, or the record vanished
    /// between read and write. The caller should reload and retry.
    #[error("Version conflict on inventory record {0}")]
    Conflict(InventoryId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain value.
    #[error("Stored inventory could not be decoded: {0}")]
    Decode(String),
}

/// Errors reported by the allocation engine.
///
/// Every variant carries a stable code (see [`InventoryError::code`]) so the
/// boundary that translates errors to transport responses can match on it.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No product exists with the given ID.
    #[error("Product not found with ID: {0}")]
    ProductNotFound(ProductId),

    /// No inventory record exists with the given ID.
    #[error("Inventory not found with ID: {0}")]
    RecordNotFound(InventoryId),

    /// No inventory record exists for the product/warehouse pair.
    #[error("Inventory not found for product ID: {product_id} at warehouse ID: {warehouse_id}")]
    NoRecordForWarehouse {
        product_id: ProductId,
        warehouse_id: WarehouseId,
    },

    /// An inventory record already exists for the product/warehouse pair.
    #[error("Inventory already exists for product ID: {product_id}")]
    DuplicateRecord {
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    },

    /// Not enough available stock to satisfy the request.
    #[error(
        "Insufficient stock for product ID: {product_id}. Available: {available}, Requested: {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// Attempted to release more than the record has reserved.
    #[error(
        "Cannot release more than reserved quantity for product ID: {product_id}. Reserved: {reserved}, Requested: {requested}"
    )]
    InvalidRelease {
        product_id: ProductId,
        reserved: u32,
        requested: u32,
    },

    /// A cross-warehouse release ran out of reserved stock before the
    /// requested quantity was fully released. Releases already applied are
    /// not rolled back.
    #[error("Cannot release all requested quantity for product ID: {product_id}. Short by: {short_by}")]
    ReleaseShortfall {
        product_id: ProductId,
        short_by: u32,
    },

    /// A storage error occurred.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl InventoryError {
    /// Returns the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::ProductNotFound(_) => "PRD_001",
            InventoryError::RecordNotFound(_) | InventoryError::NoRecordForWarehouse { .. } => {
                "INV_001"
            }
            InventoryError::InsufficientStock { .. } => "INV_002",
            InventoryError::InvalidRelease { .. } | InventoryError::ReleaseShortfall { .. } => {
                "INV_003"
            }
            InventoryError::DuplicateRecord { .. } => "ERR_006",
            InventoryError::Store(_) => "ERR_005",
        }
    }
}

/// Result type for allocation engine operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
