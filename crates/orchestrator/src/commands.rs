//! Input commands for the orchestrator.

use common::{CustomerId, Money, ProductId, WarehouseId};

/// One requested line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderItem {
    pub product_id: ProductId,

    /// Pins the reservation to a warehouse; `None` lets the engine pick.
    pub warehouse_id: Option<WarehouseId>,

    /// Backfilled from the catalog when empty or missing.
    pub product_name: Option<String>,

    pub quantity: u32,
    pub unit_price: Money,
}

/// Request to create an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub customer_id: CustomerId,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItem>,
}

/// Request to update an order's fields and optionally replace its items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateOrder {
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,

    /// When `Some` and non-empty, replaces the order's item list.
    pub items: Option<Vec<CreateOrderItem>>,
}
