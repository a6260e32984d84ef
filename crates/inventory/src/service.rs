//! The allocation engine.

use std::sync::Arc;

use common::{InventoryId, ProductId, WarehouseId};

use crate::catalog::{NewProduct, Product, ProductStore};
use crate::error::{InventoryError, Result, StoreError};
use crate::record::{InventoryChanges, InventoryRecord, NewInventoryRecord};
use crate::store::InventoryStore;

/// Owns the reservation/release contract over per-warehouse stock records.
///
/// Quantity arguments are assumed to be positive; callers reject zero before
/// calling. Counter mutations go through a read-check-write cycle that is
/// retried on row-version conflicts, so concurrent callers serialize per
/// record and `available + reserved` stays conserved.
#[derive(Clone)]
pub struct AllocationService {
    store: Arc<dyn InventoryStore>,
    products: Arc<dyn ProductStore>,
}

impl AllocationService {
    /// Creates a new allocation service over the given stores.
    pub fn new(store: Arc<dyn InventoryStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { store, products }
    }

    // -- Queries --

    /// Total available units for a product across all of its records.
    ///
    /// A product with no records has zero available stock; that is not an
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn total_available(&self, product_id: ProductId) -> Result<u32> {
        let records = self.store.find_by_product(product_id).await?;
        Ok(records.iter().map(|r| r.quantity_available).sum())
    }

    /// The single record for a product at a warehouse.
    #[tracing::instrument(skip(self))]
    pub async fn available_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<InventoryRecord> {
        self.store
            .find_by_pair(product_id, Some(warehouse_id))
            .await?
            .ok_or(InventoryError::NoRecordForWarehouse {
                product_id,
                warehouse_id,
            })
    }

    // -- Reservation --

    /// Reserves `quantity` units from the record at the named warehouse.
    #[tracing::instrument(skip(self))]
    pub async fn reserve_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
    ) -> Result<InventoryRecord> {
        loop {
            let mut record = self.available_at(product_id, warehouse_id).await?;
            record.reserve(quantity)?;

            match self.store.update(&record).await {
                Ok(updated) => {
                    metrics::counter!("inventory_reservations_total").increment(1);
                    tracing::info!(%product_id, %warehouse_id, quantity, "quantity reserved");
                    return Ok(updated);
                }
                Err(StoreError::Conflict(id)) => {
                    tracing::debug!(record = %id, "reservation raced, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reserves `quantity` units for a product, letting the engine pick the
    /// warehouse.
    ///
    /// Candidates are the product's records with enough available stock,
    /// largest first; the reservation lands on a single record and is never
    /// split across warehouses. Fails with `InsufficientStock` when no single
    /// record can satisfy the request, even if the records together could.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord> {
        loop {
            let records = self.store.find_by_product(product_id).await?;
            let best_available = records
                .iter()
                .map(|r| r.quantity_available)
                .max()
                .unwrap_or(0);

            let mut candidates: Vec<InventoryRecord> = records
                .into_iter()
                .filter(|r| r.quantity_available >= quantity)
                .collect();
            candidates.sort_by(|a, b| b.quantity_available.cmp(&a.quantity_available));

            let Some(mut record) = candidates.into_iter().next() else {
                return Err(InventoryError::InsufficientStock {
                    product_id,
                    available: best_available,
                    requested: quantity,
                });
            };
            record.reserve(quantity)?;

            match self.store.update(&record).await {
                Ok(updated) => {
                    metrics::counter!("inventory_reservations_total").increment(1);
                    tracing::info!(%product_id, quantity, record = %updated.id, "quantity reserved");
                    return Ok(updated);
                }
                Err(StoreError::Conflict(id)) => {
                    tracing::debug!(record = %id, "reservation raced, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // -- Release --

    /// Releases `quantity` reserved units back to available at the named
    /// warehouse.
    #[tracing::instrument(skip(self))]
    pub async fn release_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
    ) -> Result<InventoryRecord> {
        loop {
            let mut record = self.available_at(product_id, warehouse_id).await?;
            record.release(quantity)?;

            match self.store.update(&record).await {
                Ok(updated) => {
                    metrics::counter!("inventory_releases_total").increment(1);
                    tracing::info!(%product_id, %warehouse_id, quantity, "reserved quantity released");
                    return Ok(updated);
                }
                Err(StoreError::Conflict(id)) => {
                    tracing::debug!(record = %id, "release raced, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Releases `quantity` reserved units for a product, walking its records
    /// in store order and taking up to each record's reserved count.
    ///
    /// When the records run out before `quantity` is fully released, fails
    /// with `ReleaseShortfall`; releases already applied stay applied.
    #[tracing::instrument(skip(self))]
    pub async fn release(&self, product_id: ProductId, quantity: u32) -> Result<InventoryRecord> {
        let records = self.store.find_by_product(product_id).await?;

        let mut remaining = quantity;
        let mut last_updated = None;
        for record in records {
            if remaining == 0 {
                break;
            }
            let (updated, released) = self.release_up_to(record.id, remaining).await?;
            if released > 0 {
                remaining -= released;
                last_updated = updated;
            }
        }

        match last_updated {
            Some(record) if remaining == 0 => {
                metrics::counter!("inventory_releases_total").increment(1);
                tracing::info!(%product_id, quantity, "reserved quantity released");
                Ok(record)
            }
            _ => Err(InventoryError::ReleaseShortfall {
                product_id,
                short_by: remaining,
            }),
        }
    }

    /// Releases up to `want` units from one record, returning the updated
    /// record and how many units were actually released.
    async fn release_up_to(
        &self,
        id: InventoryId,
        want: u32,
    ) -> Result<(Option<InventoryRecord>, u32)> {
        loop {
            let Some(mut record) = self.store.get(id).await? else {
                return Ok((None, 0));
            };
            let take = record.quantity_reserved.min(want);
            if take == 0 {
                return Ok((Some(record), 0));
            }
            record.release(take)?;

            match self.store.update(&record).await {
                Ok(updated) => return Ok((Some(updated), take)),
                Err(StoreError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    // -- Adjustment --

    /// Applies a signed delta to a record's available stock.
    #[tracing::instrument(skip(self))]
    pub async fn adjust(&self, id: InventoryId, delta: i64) -> Result<InventoryRecord> {
        loop {
            let mut record = self
                .store
                .get(id)
                .await?
                .ok_or(InventoryError::RecordNotFound(id))?;
            record.adjust(delta)?;

            match self.store.update(&record).await {
                Ok(updated) => {
                    tracing::info!(%id, delta, new_quantity = updated.quantity_available, "inventory adjusted");
                    return Ok(updated);
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!(record = %id, "adjustment raced, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // -- Record management --

    /// Creates stock for a product/warehouse pair.
    #[tracing::instrument(skip(self, record), fields(product_id = %record.product_id))]
    pub async fn create_inventory(&self, record: NewInventoryRecord) -> Result<InventoryRecord> {
        self.get_product(record.product_id).await?;

        if self
            .store
            .find_by_pair(record.product_id, record.warehouse_id)
            .await?
            .is_some()
        {
            return Err(InventoryError::DuplicateRecord {
                product_id: record.product_id,
                warehouse_id: record.warehouse_id,
            });
        }

        let created = self.store.insert(record).await?;
        tracing::info!(id = %created.id, "inventory created");
        Ok(created)
    }

    /// Loads a record by ID.
    pub async fn get_inventory(&self, id: InventoryId) -> Result<InventoryRecord> {
        self.store
            .get(id)
            .await?
            .ok_or(InventoryError::RecordNotFound(id))
    }

    /// Returns all records.
    pub async fn list_inventories(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.store.list().await?)
    }

    /// Returns the records for one product. The product must exist.
    pub async fn inventories_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryRecord>> {
        self.get_product(product_id).await?;
        Ok(self.store.find_by_product(product_id).await?)
    }

    /// Returns all records at or below their reorder level.
    pub async fn low_stock(&self) -> Result<Vec<InventoryRecord>> {
        Ok(self.store.find_low_stock().await?)
    }

    /// Overwrites a record's counters and reorder level.
    #[tracing::instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        id: InventoryId,
        changes: InventoryChanges,
    ) -> Result<InventoryRecord> {
        loop {
            let mut record = self
                .store
                .get(id)
                .await?
                .ok_or(InventoryError::RecordNotFound(id))?;
            record.quantity_available = changes.quantity_available;
            record.quantity_reserved = changes.quantity_reserved;
            record.reorder_level = changes.reorder_level;

            match self.store.update(&record).await {
                Ok(updated) => {
                    tracing::info!(%id, "inventory updated");
                    return Ok(updated);
                }
                Err(StoreError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Deletes a record.
    #[tracing::instrument(skip(self))]
    pub async fn delete_inventory(&self, id: InventoryId) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(InventoryError::RecordNotFound(id));
        }
        tracing::info!(%id, "inventory deleted");
        Ok(())
    }

    // -- Catalog --

    /// Registers a product in the catalog.
    #[tracing::instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn register_product(&self, product: NewProduct) -> Result<Product> {
        let created = self.products.insert(product).await?;
        tracing::info!(id = %created.id, "product registered");
        Ok(created)
    }

    /// Loads a product by ID.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(id)
            .await?
            .ok_or(InventoryError::ProductNotFound(id))
    }

    /// Returns all catalog products.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.list().await?)
    }
}
