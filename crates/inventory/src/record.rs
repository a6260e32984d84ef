//! Per-warehouse inventory records.

use chrono::{DateTime, Utc};
use common::{InventoryId, ProductId, WarehouseId};
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Stock counters for one product at one warehouse.
///
/// `warehouse_id` is `None` for stock that is not assigned to a named
/// warehouse; such a record still behaves as a single bucket. Reserve and
/// release move units between `quantity_available` and `quantity_reserved`,
/// conserving their sum; `adjust` is the only mutation that changes the
/// total, and only through `quantity_available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub warehouse_id: Option<WarehouseId>,
    pub quantity_available: u32,
    pub quantity_reserved: u32,

    /// Threshold at or below which the record counts as low stock.
    pub reorder_level: u32,

    /// Row version for optimistic concurrency; bumped on every update.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Returns available + reserved.
    pub fn total_quantity(&self) -> u32 {
        self.quantity_available + self.quantity_reserved
    }

    /// Returns true when available stock has fallen to the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity_available <= self.reorder_level
    }

    /// Moves `quantity` units from available to reserved.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), InventoryError> {
        if self.quantity_available < quantity {
            return Err(InventoryError::InsufficientStock {
                product_id: self.product_id,
                available: self.quantity_available,
                requested: quantity,
            });
        }
        self.quantity_available -= quantity;
        self.quantity_reserved += quantity;
        Ok(())
    }

    /// Moves `quantity` units from reserved back to available.
    pub fn release(&mut self, quantity: u32) -> Result<(), InventoryError> {
        if self.quantity_reserved < quantity {
            return Err(InventoryError::InvalidRelease {
                product_id: self.product_id,
                reserved: self.quantity_reserved,
                requested: quantity,
            });
        }
        self.quantity_reserved -= quantity;
        self.quantity_available += quantity;
        Ok(())
    }

    /// Applies a signed delta to available stock. Reserved is untouched.
    pub fn adjust(&mut self, delta: i64) -> Result<(), InventoryError> {
        let new_quantity = self.quantity_available as i64 + delta;
        if new_quantity < 0 {
            return Err(InventoryError::InsufficientStock {
                product_id: self.product_id,
                available: self.quantity_available,
                requested: delta.unsigned_abs() as u32,
            });
        }
        self.quantity_available = new_quantity as u32;
        Ok(())
    }
}

/// An inventory record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryRecord {
    pub product_id: ProductId,
    pub warehouse_id: Option<WarehouseId>,
    pub quantity_available: u32,
    pub quantity_reserved: u32,
    pub reorder_level: u32,
}

/// Counter overrides applied by [`crate::AllocationService::update_inventory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChanges {
    pub quantity_available: u32,
    pub quantity_reserved: u32,
    pub reorder_level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(available: u32, reserved: u32, reorder: u32) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::new(1),
            product_id: ProductId::new(101),
            warehouse_id: Some(WarehouseId::new(1)),
            quantity_available: available,
            quantity_reserved: reserved,
            reorder_level: reorder,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn reserve_moves_available_to_reserved() {
        let mut rec = record(10, 0, 5);
        rec.reserve(2).unwrap();
        assert_eq!(rec.quantity_available, 8);
        assert_eq!(rec.quantity_reserved, 2);
    }

    #[test]
    fn reserve_rejects_more_than_available() {
        let mut rec = record(3, 0, 5);
        let err = rec.reserve(4).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }
        ));
        assert_eq!(rec.quantity_available, 3);
    }

    #[test]
    fn release_rejects_more_than_reserved() {
        let mut rec = record(5, 2, 5);
        let err = rec.release(3).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InvalidRelease {
                reserved: 2,
                requested: 3,
                ..
            }
        ));
    }

    #[test]
    fn reserve_release_conserves_total() {
        let mut rec = record(10, 5, 5);
        let total = rec.total_quantity();

        rec.reserve(4).unwrap();
        rec.reserve(1).unwrap();
        rec.release(3).unwrap();
        rec.release(2).unwrap();

        assert_eq!(rec.total_quantity(), total);
    }

    #[test]
    fn adjust_changes_only_available() {
        let mut rec = record(10, 2, 5);
        rec.adjust(-4).unwrap();
        assert_eq!(rec.quantity_available, 6);
        assert_eq!(rec.quantity_reserved, 2);

        rec.adjust(14).unwrap();
        assert_eq!(rec.quantity_available, 20);
    }

    #[test]
    fn adjust_rejects_negative_result() {
        let mut rec = record(3, 0, 5);
        assert!(rec.adjust(-4).is_err());
        assert_eq!(rec.quantity_available, 3);
    }

    #[test]
    fn low_stock_at_or_below_reorder_level() {
        assert!(record(5, 0, 5).is_low_stock());
        assert!(record(0, 10, 5).is_low_stock());
        assert!(!record(6, 0, 5).is_low_stock());
    }
}
