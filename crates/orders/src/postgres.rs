use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, WarehouseId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderItem};
use crate::status::OrderStatus;
use crate::store::OrderStore;

/// PostgreSQL-backed order store.
///
/// Items live in `order_items` with `ON DELETE CASCADE`, so an item row can
/// never outlive its order.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status: OrderStatus = status
            .parse()
            .map_err(|e: crate::status::ParseStatusError| StoreError::Decode(e.to_string()))?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            status,
            shipping_address: row.try_get("shipping_address")?,
            billing_address: row.try_get("billing_address")?,
            notes: row.try_get("notes")?,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        let warehouse_id: Option<i64> = row.try_get("warehouse_id")?;
        let quantity: i32 = row.try_get("quantity")?;

        Ok(OrderItem {
            product_id: ProductId::new(row.try_get("product_id")?),
            warehouse_id: warehouse_id.map(WarehouseId::new),
            product_name: row.try_get("product_name")?,
            quantity: quantity as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
        })
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, warehouse_id, product_name, quantity, unit_price_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn load_orders(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = OrderId::new(row.try_get("id")?);
            let items = self.load_items(id).await?;
            orders.push(Self::row_to_order(row, items)?);
        }
        Ok(orders)
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, customer_id, status, shipping_address, billing_address, notes,
           total_amount_cents, created_at, updated_at
    FROM orders
"#;

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order> {
        let total = order.items.iter().map(|i| i.subtotal()).sum::<Money>();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, status, shipping_address, billing_address, notes, total_amount_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(order.status.as_str())
        .bind(&order.shipping_address)
        .bind(&order.billing_address)
        .bind(&order.notes)
        .bind(total.cents())
        .fetch_one(&mut *tx)
        .await?;

        let id = OrderId::new(row.try_get("id")?);
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, warehouse_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(item.warehouse_id.map(|w| w.as_i64()))
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id,
            customer_id: order.customer_id,
            status: order.status,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            notes: order.notes,
            total_amount: total,
            items: order.items,
            created_at,
            updated_at,
        })
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.load_items(id).await?;
                Ok(Some(Self::row_to_order(&row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{SELECT_ORDER} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;
        self.load_orders(rows).await
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDER} WHERE customer_id = $1 ORDER BY id ASC"
        ))
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        self.load_orders(rows).await
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{SELECT_ORDER} WHERE status = $1 ORDER BY id ASC"))
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        self.load_orders(rows).await
    }

    async fn find_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{SELECT_ORDER} WHERE created_at >= $1 AND created_at <= $2 ORDER BY id ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        self.load_orders(rows).await
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let total = order.items.iter().map(|i| i.subtotal()).sum::<Money>();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, shipping_address = $3, billing_address = $4, notes = $5,
                total_amount_cents = $6, updated_at = now()
            WHERE id = $1
            RETURNING created_at, updated_at
            "#,
        )
        .bind(order.id.as_i64())
        .bind(order.status.as_str())
        .bind(&order.shipping_address)
        .bind(&order.billing_address)
        .bind(&order.notes)
        .bind(total.cents())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(order.id))?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id.as_i64())
            .execute(&mut *tx)
            .await?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, warehouse_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(item.warehouse_id.map(|w| w.as_i64()))
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut updated = order.clone();
        updated.total_amount = total;
        updated.created_at = row.try_get("created_at")?;
        updated.updated_at = row.try_get("updated_at")?;
        Ok(updated)
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn count_by_customer(&self, customer_id: CustomerId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
            .bind(customer_id.as_i64())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
