//! The order aggregate and its items.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, WarehouseId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// A line item belonging to exactly one order.
///
/// `product_id`/`warehouse_id` are weak references into the inventory
/// service; nothing at the storage layer ties the two systems together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product being ordered.
    pub product_id: ProductId,

    /// The warehouse the reservation is pinned to, if any.
    pub warehouse_id: Option<WarehouseId>,

    /// Human-readable product name, captured at order time.
    pub product_name: String,

    /// Quantity ordered (always > 0).
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            warehouse_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns `quantity * unit_price`.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order that has not been persisted yet.
///
/// The store assigns the ID and timestamps on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    /// Sum of the item subtotals.
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(OrderItem::subtotal).sum()
    }
}

/// A persisted order aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,

    /// Always `Σ item.subtotal()`; recomputed whenever items change.
    pub total_amount: Money,

    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recomputes `total_amount` from the current items.
    pub fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(OrderItem::subtotal).sum();
    }

    /// Replaces all items and recomputes the total.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) {
        self.items = items;
        self.recalculate_total();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: i64, quantity: u32, price_cents: i64) -> OrderItem {
        OrderItem::new(
            ProductId::new(product),
            None,
            format!("Product {product}"),
            quantity,
            Money::from_cents(price_cents),
        )
    }

    fn order_with_items(items: Vec<OrderItem>) -> Order {
        let total = items.iter().map(OrderItem::subtotal).sum();
        Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(10),
            status: OrderStatus::Pending,
            shipping_address: None,
            billing_address: None,
            notes: None,
            total_amount: total,
            items,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_subtotal() {
        assert_eq!(item(1, 3, 1000).subtotal().cents(), 3000);
    }

    #[test]
    fn test_new_order_total() {
        let draft = NewOrder {
            customer_id: CustomerId::new(1),
            status: OrderStatus::Pending,
            shipping_address: None,
            billing_address: None,
            notes: None,
            items: vec![item(1, 2, 500), item(2, 1, 250)],
        };
        assert_eq!(draft.total_amount().cents(), 1250);
    }

    #[test]
    fn test_replace_items_recomputes_total() {
        let mut order = order_with_items(vec![item(1, 2, 500)]);
        assert_eq!(order.total_amount.cents(), 1000);

        order.replace_items(vec![item(2, 4, 100), item(3, 1, 75)]);
        assert_eq!(order.total_amount.cents(), 475);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_total_of_empty_items_is_zero() {
        let mut order = order_with_items(vec![item(1, 1, 999)]);
        order.replace_items(vec![]);
        assert_eq!(order.total_amount, Money::zero());
    }
}
