use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{InventoryId, ProductId, WarehouseId};
use tokio::sync::RwLock;

use crate::catalog::{NewProduct, Product, ProductStore};
use crate::error::StoreError;
use crate::record::{InventoryRecord, NewInventoryRecord};
use crate::store::InventoryStore;

#[derive(Default)]
struct InventoryInner {
    records: HashMap<InventoryId, InventoryRecord>,
    next_id: i64,
}

/// In-memory inventory store.
///
/// Provides the same interface and version-check semantics as the PostgreSQL
/// implementation; used as the default store and in tests.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    inner: Arc<RwLock<InventoryInner>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory inventory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_id(mut records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    records.sort_by_key(|r| r.id);
    records
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert(&self, record: NewInventoryRecord) -> Result<InventoryRecord, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let stored = InventoryRecord {
            id: InventoryId::new(inner.next_id),
            product_id: record.product_id,
            warehouse_id: record.warehouse_id,
            quantity_available: record.quantity_available,
            quantity_reserved: record.quantity_reserved,
            reorder_level: record.reorder_level,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        inner.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: InventoryId) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(inner.records.values().cloned().collect()))
    }

    async fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner
                .records
                .values()
                .filter(|r| r.product_id == product_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_pair(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .find(|r| r.product_id == product_id && r.warehouse_id == warehouse_id)
            .cloned())
    }

    async fn find_low_stock(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner
                .records
                .values()
                .filter(|r| r.is_low_stock())
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, record: &InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.records.get(&record.id) {
            Some(stored) if stored.version == record.version => {
                let mut updated = record.clone();
                updated.version += 1;
                updated.updated_at = Utc::now();
                inner.records.insert(updated.id, updated.clone());
                Ok(updated)
            }
            _ => Err(StoreError::Conflict(record.id)),
        }
    }

    async fn delete(&self, id: InventoryId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.remove(&id).is_some())
    }
}

#[derive(Default)]
struct ProductInner {
    products: HashMap<ProductId, Product>,
    next_id: i64,
}

/// In-memory product catalog store.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    inner: Arc<RwLock<ProductInner>>,
}

impl InMemoryProductStore {
    /// Creates a new empty in-memory product store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let stored = Product {
            id: ProductId::new(inner.next_id),
            sku: product.sku,
            name: product.name,
            is_active: product.is_active,
        };
        inner.products.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().await;
        let mut products: Vec<_> = inner.products.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_record(product: i64, warehouse: Option<i64>, available: u32) -> NewInventoryRecord {
        NewInventoryRecord {
            product_id: ProductId::new(product),
            warehouse_id: warehouse.map(WarehouseId::new),
            quantity_available: available,
            quantity_reserved: 0,
            reorder_level: 10,
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_initial_version() {
        let store = InMemoryInventoryStore::new();
        let rec = store.insert(new_record(101, Some(1), 10)).await.unwrap();
        assert_eq!(rec.id, InventoryId::new(1));
        assert_eq!(rec.version, 1);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = InMemoryInventoryStore::new();
        let rec = store.insert(new_record(101, Some(1), 10)).await.unwrap();

        let mut first = rec.clone();
        first.quantity_available = 9;
        let updated = store.update(&first).await.unwrap();
        assert_eq!(updated.version, 2);

        // Second writer still holds version 1.
        let mut second = rec.clone();
        second.quantity_available = 5;
        let result = store.update(&second).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_after_delete_conflicts() {
        let store = InMemoryInventoryStore::new();
        let rec = store.insert(new_record(101, None, 10)).await.unwrap();
        assert!(store.delete(rec.id).await.unwrap());
        assert!(!store.delete(rec.id).await.unwrap());

        let result = store.update(&rec).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn find_by_pair_distinguishes_pooled_records() {
        let store = InMemoryInventoryStore::new();
        store.insert(new_record(101, Some(1), 10)).await.unwrap();
        store.insert(new_record(101, None, 3)).await.unwrap();

        let pinned = store
            .find_by_pair(ProductId::new(101), Some(WarehouseId::new(1)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pinned.quantity_available, 10);

        let pooled = store
            .find_by_pair(ProductId::new(101), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pooled.quantity_available, 3);

        assert!(store
            .find_by_pair(ProductId::new(101), Some(WarehouseId::new(2)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn find_low_stock_uses_reorder_level() {
        let store = InMemoryInventoryStore::new();
        let mut low = new_record(101, Some(1), 10);
        low.reorder_level = 10;
        let mut ok = new_record(102, Some(1), 50);
        ok.reorder_level = 10;
        store.insert(low).await.unwrap();
        store.insert(ok).await.unwrap();

        let hits = store.find_low_stock().await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product_id, ProductId::new(101));
    }

    #[tokio::test]
    async fn product_store_roundtrip() {
        let store = InMemoryProductStore::new();
        let product = store
            .insert(NewProduct {
                sku: "SKU-001".to_string(),
                name: "Widget".to_string(),
                is_active: true,
            })
            .await
            .unwrap();

        let loaded = store.get(product.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Widget");
        assert!(store.get(ProductId::new(99)).await.unwrap().is_none());
    }
}
