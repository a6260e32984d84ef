//! Call boundary between the order orchestrator and the inventory service.
//!
//! The orchestrator only ever talks to [`InventoryGateway`]; what sits behind
//! it is an adapter choice. [`DirectInventoryGateway`] calls the allocation
//! engine in-process, [`HttpInventoryGateway`] speaks to a remote instance
//! over HTTP, and [`InMemoryInventoryGateway`] is a deterministic double for
//! tests.
//!
//! Every failure is classified: [`GatewayError::Rejected`] means the
//! inventory service answered and said no (with its machine-readable code);
//! [`GatewayError::Transport`] means it could not be reached or answered
//! malformed. The orchestrator's compensation logic depends on this
//! distinction being unambiguous.

mod direct;
mod error;
mod http;
mod memory;
mod types;

use async_trait::async_trait;
use common::{ProductId, WarehouseId};

pub use direct::DirectInventoryGateway;
pub use error::GatewayError;
pub use http::HttpInventoryGateway;
pub use memory::{InMemoryInventoryGateway, StockCall};
pub use types::{ProductInfo, StockLevel};

/// Request/response boundary to the inventory service.
///
/// Reserve and release take an optional warehouse: `Some` pins the operation
/// to that warehouse's record, `None` lets the engine pick (reserve) or walk
/// the product's records (release).
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Resolves a product for validation.
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, GatewayError>;

    /// Total available units for a product across all warehouses.
    async fn total_available(&self, product_id: ProductId) -> Result<u32, GatewayError>;

    /// Stock level for a product at a specific warehouse.
    async fn available_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<StockLevel, GatewayError>;

    /// Reserves `quantity` units, pinned or pooled.
    async fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError>;

    /// Releases `quantity` previously reserved units, pinned or pooled.
    async fn release(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError>;
}
