//! PostgreSQL integration tests for the inventory stores.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p inventory --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{ProductId, WarehouseId};
use inventory::{
    AllocationService, InventoryError, InventoryStore, NewInventoryRecord, NewProduct,
    PostgresInventoryStore, PostgresProductStore, ProductStore, StoreError,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/001_create_core_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE inventory, products RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

async fn seeded_service(pool: PgPool) -> (AllocationService, ProductId) {
    let inventory = PostgresInventoryStore::new(pool.clone());
    let products = PostgresProductStore::new(pool);
    let service = AllocationService::new(Arc::new(inventory), Arc::new(products));

    let product = service
        .register_product(NewProduct {
            sku: "SKU-101".to_string(),
            name: "Widget".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    (service, product.id)
}

#[tokio::test]
async fn insert_get_and_pair_lookup() {
    let pool = get_test_pool().await;
    let store = PostgresInventoryStore::new(pool.clone());
    let products = PostgresProductStore::new(pool);

    let product = products
        .insert(NewProduct {
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    let record = store
        .insert(NewInventoryRecord {
            product_id: product.id,
            warehouse_id: Some(WarehouseId::new(1)),
            quantity_available: 10,
            quantity_reserved: 0,
            reorder_level: 5,
        })
        .await
        .unwrap();
    assert_eq!(record.version, 1);

    let loaded = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded, record);

    let by_pair = store
        .find_by_pair(product.id, Some(WarehouseId::new(1)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_pair.id, record.id);

    assert!(store
        .find_by_pair(product.id, None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn stale_version_update_conflicts() {
    let pool = get_test_pool().await;
    let store = PostgresInventoryStore::new(pool.clone());
    let products = PostgresProductStore::new(pool);

    let product = products
        .insert(NewProduct {
            sku: "SKU-2".to_string(),
            name: "Gadget".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    let record = store
        .insert(NewInventoryRecord {
            product_id: product.id,
            warehouse_id: None,
            quantity_available: 10,
            quantity_reserved: 0,
            reorder_level: 5,
        })
        .await
        .unwrap();

    let mut first = record.clone();
    first.quantity_available = 9;
    let updated = store.update(&first).await.unwrap();
    assert_eq!(updated.version, 2);

    let mut second = record.clone();
    second.quantity_available = 4;
    let result = store.update(&second).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn reserve_and_release_through_service() {
    let pool = get_test_pool().await;
    let (service, product_id) = seeded_service(pool).await;

    service
        .create_inventory(NewInventoryRecord {
            product_id,
            warehouse_id: Some(WarehouseId::new(1)),
            quantity_available: 10,
            quantity_reserved: 0,
            reorder_level: 5,
        })
        .await
        .unwrap();

    let reserved = service
        .reserve_at(product_id, WarehouseId::new(1), 2)
        .await
        .unwrap();
    assert_eq!(reserved.quantity_available, 8);
    assert_eq!(reserved.quantity_reserved, 2);

    let released = service
        .release_at(product_id, WarehouseId::new(1), 2)
        .await
        .unwrap();
    assert_eq!(released.quantity_available, 10);
    assert_eq!(released.total_quantity(), 10);
}

#[tokio::test]
async fn duplicate_pair_rejected_through_service() {
    let pool = get_test_pool().await;
    let (service, product_id) = seeded_service(pool).await;

    let record = NewInventoryRecord {
        product_id,
        warehouse_id: Some(WarehouseId::new(7)),
        quantity_available: 1,
        quantity_reserved: 0,
        reorder_level: 1,
    };
    service.create_inventory(record.clone()).await.unwrap();

    let err = service.create_inventory(record).await.unwrap_err();
    assert!(matches!(err, InventoryError::DuplicateRecord { .. }));
}

#[tokio::test]
async fn low_stock_query_matches_predicate() {
    let pool = get_test_pool().await;
    let (service, product_id) = seeded_service(pool).await;

    service
        .create_inventory(NewInventoryRecord {
            product_id,
            warehouse_id: Some(WarehouseId::new(1)),
            quantity_available: 5,
            quantity_reserved: 0,
            reorder_level: 5,
        })
        .await
        .unwrap();
    service
        .create_inventory(NewInventoryRecord {
            product_id,
            warehouse_id: Some(WarehouseId::new(2)),
            quantity_available: 50,
            quantity_reserved: 0,
            reorder_level: 5,
        })
        .await
        .unwrap();

    let low = service.low_stock().await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].warehouse_id, Some(WarehouseId::new(1)));
}
