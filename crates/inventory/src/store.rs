use async_trait::async_trait;
use common::{InventoryId, ProductId, WarehouseId};

use crate::error::StoreError;
use crate::record::{InventoryRecord, NewInventoryRecord};

/// Persistence boundary for inventory records.
///
/// `update` is a compare-and-swap on the record's `version` field; that is
/// the only write path for counter mutations, so the read-check-write cycles
/// in the allocation service serialize per record even across processes.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Persists a new record with version 1, assigning its ID.
    async fn insert(&self, record: NewInventoryRecord) -> Result<InventoryRecord, StoreError>;

    /// Loads a record by ID. Returns `None` when absent.
    async fn get(&self, id: InventoryId) -> Result<Option<InventoryRecord>, StoreError>;

    /// Returns all records.
    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Returns the product's records in stable (insertion) order.
    async fn find_by_product(&self, product_id: ProductId)
    -> Result<Vec<InventoryRecord>, StoreError>;

    /// Loads the single record for a product/warehouse pair.
    async fn find_by_pair(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<Option<InventoryRecord>, StoreError>;

    /// Returns all records with `quantity_available <= reorder_level`.
    async fn find_low_stock(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Writes the record if the stored version matches `record.version`,
    /// bumping the version and `updated_at`. Fails with
    /// [`StoreError::Conflict`] when the version differs or the record no
    /// longer exists.
    async fn update(&self, record: &InventoryRecord) -> Result<InventoryRecord, StoreError>;

    /// Deletes a record. Returns whether a record was deleted.
    async fn delete(&self, id: InventoryId) -> Result<bool, StoreError>;
}
