//! In-process adapter over the allocation engine.

use async_trait::async_trait;
use common::{ProductId, WarehouseId};
use inventory::{AllocationService, InventoryError};

use crate::error::GatewayError;
use crate::types::{ProductInfo, StockLevel};
use crate::InventoryGateway;

/// Calls the allocation engine directly, without a network hop.
///
/// Business errors keep their engine codes as rejections; storage failures
/// are classified as transport, since the caller can no more act on them
/// than on a broken connection.
#[derive(Clone)]
pub struct DirectInventoryGateway {
    allocation: AllocationService,
}

impl DirectInventoryGateway {
    /// Creates a gateway over the given allocation service.
    pub fn new(allocation: AllocationService) -> Self {
        Self { allocation }
    }
}

fn classify(err: InventoryError) -> GatewayError {
    match err {
        InventoryError::Store(e) => GatewayError::Transport(e.to_string()),
        other => GatewayError::Rejected {
            code: other.code().to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl InventoryGateway for DirectInventoryGateway {
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, GatewayError> {
        self.allocation
            .get_product(product_id)
            .await
            .map(ProductInfo::from)
            .map_err(classify)
    }

    async fn total_available(&self, product_id: ProductId) -> Result<u32, GatewayError> {
        self.allocation
            .total_available(product_id)
            .await
            .map_err(classify)
    }

    async fn available_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<StockLevel, GatewayError> {
        self.allocation
            .available_at(product_id, warehouse_id)
            .await
            .map(StockLevel::from)
            .map_err(classify)
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let result = match warehouse_id {
            Some(warehouse_id) => {
                self.allocation
                    .reserve_at(product_id, warehouse_id, quantity)
                    .await
            }
            None => self.allocation.reserve(product_id, quantity).await,
        };
        result.map(StockLevel::from).map_err(classify)
    }

    async fn release(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let result = match warehouse_id {
            Some(warehouse_id) => {
                self.allocation
                    .release_at(product_id, warehouse_id, quantity)
                    .await
            }
            None => self.allocation.release(product_id, quantity).await,
        };
        result.map(StockLevel::from).map_err(classify)
    }
}
