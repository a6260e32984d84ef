use common::{InventoryId, ProductId, WarehouseId};
use inventory::{InventoryRecord, Product};
use serde::{Deserialize, Serialize};

/// Product data needed to validate an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub is_active: bool,
}

impl From<Product> for ProductInfo {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            is_active: product.is_active,
        }
    }
}

/// Stock counters for one inventory record, as reported over the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub warehouse_id: Option<WarehouseId>,
    pub quantity_available: u32,
    pub quantity_reserved: u32,
    pub total_quantity: u32,
    pub is_low_stock: bool,
}

impl From<InventoryRecord> for StockLevel {
    fn from(record: InventoryRecord) -> Self {
        Self {
            total_quantity: record.total_quantity(),
            is_low_stock: record.is_low_stock(),
            id: record.id,
            product_id: record.product_id,
            warehouse_id: record.warehouse_id,
            quantity_available: record.quantity_available,
            quantity_reserved: record.quantity_reserved,
        }
    }
}
