//! PostgreSQL integration tests for the order store.
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p orders --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{CustomerId, Money, OrderId, ProductId};
use orders::{NewOrder, OrderItem, OrderStatus, OrderStore, PostgresOrderStore, StoreError};
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

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn draft(customer: i64) -> NewOrder {
    NewOrder {
        customer_id: CustomerId::new(customer),
        status: OrderStatus::Pending,
        shipping_address: Some("12 North Quay".to_string()),
        billing_address: Some("12 North Quay".to_string()),
        notes: None,
        items: vec![
            OrderItem::new(ProductId::new(101), None, "Widget", 2, Money::from_cents(1000)),
            OrderItem::new(ProductId::new(102), None, "Gadget", 1, Money::from_cents(2500)),
        ],
    }
}

#[tokio::test]
async fn insert_and_get_roundtrip() {
    let store = get_test_store().await;

    let order = store.insert(draft(1)).await.unwrap();
    assert_eq!(order.total_amount.cents(), 4500);
    assert_eq!(order.items.len(), 2);

    let loaded = store.get(order.id).await.unwrap().unwrap();
    assert_eq!(loaded, order);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(OrderId::new(404)).await.unwrap().is_none());
}

#[tokio::test]
async fn update_replaces_items_and_bumps_timestamp() {
    let store = get_test_store().await;
    let mut order = store.insert(draft(1)).await.unwrap();

    order.status = OrderStatus::Confirmed;
    order.replace_items(vec![OrderItem::new(
        ProductId::new(103),
        None,
        "Sprocket",
        4,
        Money::from_cents(100),
    )]);

    let updated = store.update(&order).await.unwrap();
    assert_eq!(updated.status, OrderStatus::Confirmed);
    assert_eq!(updated.total_amount.cents(), 400);
    assert!(updated.updated_at >= updated.created_at);

    let loaded = store.get(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].product_name, "Sprocket");
}

#[tokio::test]
async fn delete_cascades_items() {
    let store = get_test_store().await;
    let order = store.insert(draft(1)).await.unwrap();

    store.delete(order.id).await.unwrap();
    assert!(store.get(order.id).await.unwrap().is_none());

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE order_id = $1")
        .bind(order.id.as_i64())
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    let result = store.delete(order.id).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn queries_filter_by_customer_status_and_date() {
    let store = get_test_store().await;
    let first = store.insert(draft(1)).await.unwrap();
    store.insert(draft(2)).await.unwrap();

    let mut cancelled = first.clone();
    cancelled.status = OrderStatus::Cancelled;
    store.update(&cancelled).await.unwrap();

    assert_eq!(store.find_by_customer(CustomerId::new(1)).await.unwrap().len(), 1);
    assert_eq!(
        store
            .find_by_status(OrderStatus::Cancelled)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(store.count_by_customer(CustomerId::new(2)).await.unwrap(), 1);

    let window = store
        .find_between(
            first.created_at - chrono::Duration::minutes(1),
            first.created_at + chrono::Duration::minutes(1),
        )
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
}
