//! In-memory gateway double for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{InventoryId, ProductId, WarehouseId};

use crate::error::GatewayError;
use crate::types::{ProductInfo, StockLevel};
use crate::InventoryGateway;

/// One recorded reserve or release call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCall {
    pub product_id: ProductId,
    pub warehouse_id: Option<WarehouseId>,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
struct Bucket {
    id: InventoryId,
    available: u32,
    reserved: u32,
}

#[derive(Default)]
struct Inner {
    products: HashMap<ProductId, ProductInfo>,
    stock: HashMap<(ProductId, Option<WarehouseId>), Bucket>,
    next_bucket_id: i64,
    reserve_calls: Vec<StockCall>,
    release_calls: Vec<StockCall>,
    fail_reserve_for: HashSet<ProductId>,
    fail_reserve_transport_for: HashSet<ProductId>,
    fail_release_for: HashSet<ProductId>,
    unavailable: bool,
}

/// Deterministic in-memory gateway for testing the orchestrator.
///
/// Holds product and stock fixtures, records every reserve/release call
/// issued through it, and supports failure injection: per-product rejections
/// and a global "service unreachable" switch.
#[derive(Clone, Default)]
pub struct InMemoryInventoryGateway {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryInventoryGateway {
    /// Creates a new empty in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product fixture.
    pub fn add_product(&self, id: ProductId, name: impl Into<String>, is_active: bool) {
        self.inner.write().unwrap().products.insert(
            id,
            ProductInfo {
                id,
                name: name.into(),
                is_active,
            },
        );
    }

    /// Sets the available stock for a product bucket (reserved starts at 0).
    pub fn set_stock(&self, product_id: ProductId, warehouse_id: Option<WarehouseId>, available: u32) {
        let mut inner = self.inner.write().unwrap();
        inner.next_bucket_id += 1;
        let bucket = Bucket {
            id: InventoryId::new(inner.next_bucket_id),
            available,
            reserved: 0,
        };
        inner.stock.insert((product_id, warehouse_id), bucket);
    }

    /// Makes every call fail with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.write().unwrap().unavailable = unavailable;
    }

    /// Makes reserve calls for the given product fail with a rejection.
    pub fn fail_reserve_for(&self, product_id: ProductId) {
        self.inner.write().unwrap().fail_reserve_for.insert(product_id);
    }

    /// Makes reserve calls for the given product fail with a transport error,
    /// as a timed-out or dropped connection would.
    pub fn fail_reserve_transport_for(&self, product_id: ProductId) {
        self.inner
            .write()
            .unwrap()
            .fail_reserve_transport_for
            .insert(product_id);
    }

    /// Makes release calls for the given product fail with a rejection.
    pub fn fail_release_for(&self, product_id: ProductId) {
        self.inner.write().unwrap().fail_release_for.insert(product_id);
    }

    /// Returns every reserve call issued so far, in order.
    pub fn reserve_calls(&self) -> Vec<StockCall> {
        self.inner.read().unwrap().reserve_calls.clone()
    }

    /// Returns every release call issued so far, in order.
    pub fn release_calls(&self) -> Vec<StockCall> {
        self.inner.read().unwrap().release_calls.clone()
    }

    /// Returns `(available, reserved)` for a bucket, if it exists.
    pub fn stock_at(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> Option<(u32, u32)> {
        self.inner
            .read()
            .unwrap()
            .stock
            .get(&(product_id, warehouse_id))
            .map(|b| (b.available, b.reserved))
    }

    fn check_available(inner: &Inner) -> Result<(), GatewayError> {
        if inner.unavailable {
            return Err(GatewayError::Transport(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }

    fn level(product_id: ProductId, warehouse_id: Option<WarehouseId>, bucket: &Bucket) -> StockLevel {
        StockLevel {
            id: bucket.id,
            product_id,
            warehouse_id,
            quantity_available: bucket.available,
            quantity_reserved: bucket.reserved,
            total_quantity: bucket.available + bucket.reserved,
            is_low_stock: false,
        }
    }
}

#[async_trait]
impl InventoryGateway for InMemoryInventoryGateway {
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, GatewayError> {
        let inner = self.inner.read().unwrap();
        Self::check_available(&inner)?;
        inner
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected {
                code: "PRD_001".to_string(),
                message: format!("Product not found with ID: {product_id}"),
            })
    }

    async fn total_available(&self, product_id: ProductId) -> Result<u32, GatewayError> {
        let inner = self.inner.read().unwrap();
        Self::check_available(&inner)?;
        Ok(inner
            .stock
            .iter()
            .filter(|((p, _), _)| *p == product_id)
            .map(|(_, b)| b.available)
            .sum())
    }

    async fn available_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<StockLevel, GatewayError> {
        let inner = self.inner.read().unwrap();
        Self::check_available(&inner)?;
        inner
            .stock
            .get(&(product_id, Some(warehouse_id)))
            .map(|b| Self::level(product_id, Some(warehouse_id), b))
            .ok_or_else(|| GatewayError::Rejected {
                code: "INV_001".to_string(),
                message: format!(
                    "Inventory not found for product ID: {product_id} at warehouse ID: {warehouse_id}"
                ),
            })
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let mut inner = self.inner.write().unwrap();
        Self::check_available(&inner)?;
        inner.reserve_calls.push(StockCall {
            product_id,
            warehouse_id,
            quantity,
        });

        if inner.fail_reserve_transport_for.contains(&product_id) {
            return Err(GatewayError::Transport("request timed out".to_string()));
        }

        if inner.fail_reserve_for.contains(&product_id) {
            return Err(GatewayError::Rejected {
                code: "INV_002".to_string(),
                message: format!("Insufficient stock for product ID: {product_id}"),
            });
        }

        // Pinned reservations hit their bucket; pooled ones take the largest
        // bucket that can satisfy the whole quantity, like the real engine.
        let key = match warehouse_id {
            Some(warehouse_id) => (product_id, Some(warehouse_id)),
            None => {
                let candidate = inner
                    .stock
                    .iter()
                    .filter(|((p, _), b)| *p == product_id && b.available >= quantity)
                    .max_by_key(|(_, b)| b.available)
                    .map(|(key, _)| *key);
                match candidate {
                    Some(key) => key,
                    None => {
                        return Err(GatewayError::Rejected {
                            code: "INV_002".to_string(),
                            message: format!("Insufficient stock for product ID: {product_id}"),
                        });
                    }
                }
            }
        };

        let bucket = inner
            .stock
            .get_mut(&key)
            .ok_or_else(|| GatewayError::Rejected {
                code: "INV_001".to_string(),
                message: format!("Inventory not found for product ID: {product_id}"),
            })?;

        if bucket.available < quantity {
            let available = bucket.available;
            return Err(GatewayError::Rejected {
                code: "INV_002".to_string(),
                message: format!(
                    "Insufficient stock for product ID: {product_id}. Available: {available}, Requested: {quantity}"
                ),
            });
        }

        bucket.available -= quantity;
        bucket.reserved += quantity;
        let level = Self::level(key.0, key.1, bucket);
        Ok(level)
    }

    async fn release(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let mut inner = self.inner.write().unwrap();
        Self::check_available(&inner)?;
        inner.release_calls.push(StockCall {
            product_id,
            warehouse_id,
            quantity,
        });

        if inner.fail_release_for.contains(&product_id) {
            return Err(GatewayError::Rejected {
                code: "INV_003".to_string(),
                message: format!("Cannot release for product ID: {product_id}"),
            });
        }

        match warehouse_id {
            Some(warehouse_id) => {
                let key = (product_id, Some(warehouse_id));
                let bucket = inner
                    .stock
                    .get_mut(&key)
                    .ok_or_else(|| GatewayError::Rejected {
                        code: "INV_001".to_string(),
                        message: format!("Inventory not found for product ID: {product_id}"),
                    })?;
                if bucket.reserved < quantity {
                    let reserved = bucket.reserved;
                    return Err(GatewayError::Rejected {
                        code: "INV_003".to_string(),
                        message: format!(
                            "Cannot release more than reserved quantity. Reserved: {reserved}, Requested: {quantity}"
                        ),
                    });
                }
                bucket.reserved -= quantity;
                bucket.available += quantity;
                Ok(Self::level(key.0, key.1, bucket))
            }
            None => {
                let mut keys: Vec<_> = inner
                    .stock
                    .iter()
                    .filter(|((p, _), _)| *p == product_id)
                    .map(|(key, b)| (*key, b.id))
                    .collect();
                keys.sort_by_key(|(_, id)| *id);

                let mut remaining = quantity;
                let mut last = None;
                for (key, _) in keys {
                    if remaining == 0 {
                        break;
                    }
                    let bucket = inner.stock.get_mut(&key).expect("bucket exists");
                    let take = bucket.reserved.min(remaining);
                    if take > 0 {
                        bucket.reserved -= take;
                        bucket.available += take;
                        remaining -= take;
                        last = Some(Self::level(key.0, key.1, bucket));
                    }
                }

                match last {
                    Some(level) if remaining == 0 => Ok(level),
                    _ => Err(GatewayError::Rejected {
                        code: "INV_003".to_string(),
                        message: format!(
                            "Cannot release all requested quantity for product ID: {product_id}. Short by: {remaining}"
                        ),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_reserve_and_release_calls() {
        let gateway = InMemoryInventoryGateway::new();
        let product = ProductId::new(101);
        gateway.add_product(product, "Widget", true);
        gateway.set_stock(product, None, 10);

        gateway.reserve(product, None, 2).await.unwrap();
        gateway.release(product, None, 2).await.unwrap();

        assert_eq!(gateway.reserve_calls().len(), 1);
        assert_eq!(gateway.release_calls().len(), 1);
        assert_eq!(gateway.reserve_calls()[0].quantity, 2);
        assert_eq!(gateway.stock_at(product, None), Some((10, 0)));
    }

    #[tokio::test]
    async fn unavailable_fails_with_transport() {
        let gateway = InMemoryInventoryGateway::new();
        gateway.set_unavailable(true);

        let err = gateway.get_product(ProductId::new(1)).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn injected_reserve_failure_is_recorded() {
        let gateway = InMemoryInventoryGateway::new();
        let product = ProductId::new(101);
        gateway.set_stock(product, None, 10);
        gateway.fail_reserve_for(product);

        let err = gateway.reserve(product, None, 1).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
        assert_eq!(gateway.reserve_calls().len(), 1);
        // Stock untouched by the injected failure.
        assert_eq!(gateway.stock_at(product, None), Some((10, 0)));
    }

    #[tokio::test]
    async fn pooled_reserve_takes_largest_bucket() {
        let gateway = InMemoryInventoryGateway::new();
        let product = ProductId::new(101);
        gateway.set_stock(product, Some(WarehouseId::new(1)), 3);
        gateway.set_stock(product, Some(WarehouseId::new(2)), 10);

        let level = gateway.reserve(product, None, 5).await.unwrap();
        assert_eq!(level.warehouse_id, Some(WarehouseId::new(2)));
        assert_eq!(level.quantity_available, 5);
        assert_eq!(
            gateway.stock_at(product, Some(WarehouseId::new(1))),
            Some((3, 0))
        );
    }
}
