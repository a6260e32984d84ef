use async_trait::async_trait;
use common::{InventoryId, ProductId, WarehouseId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::catalog::{NewProduct, Product, ProductStore};
use crate::error::StoreError;
use crate::record::{InventoryRecord, NewInventoryRecord};
use crate::store::InventoryStore;

/// PostgreSQL-backed inventory store.
///
/// `update` relies on a conditional `UPDATE ... WHERE version = $n`; a zero
/// row count surfaces as [`StoreError::Conflict`].
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: &PgRow) -> Result<InventoryRecord, StoreError> {
        let warehouse_id: Option<i64> = row.try_get("warehouse_id")?;
        let available: i32 = row.try_get("quantity_available")?;
        let reserved: i32 = row.try_get("quantity_reserved")?;
        let reorder: i32 = row.try_get("reorder_level")?;

        Ok(InventoryRecord {
            id: InventoryId::new(row.try_get("id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            warehouse_id: warehouse_id.map(WarehouseId::new),
            quantity_available: available as u32,
            quantity_reserved: reserved as u32,
            reorder_level: reorder as u32,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const SELECT_RECORD: &str = r#"
    SELECT id, product_id, warehouse_id, quantity_available, quantity_reserved,
           reorder_level, version, created_at, updated_at
    FROM inventory
"#;

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn insert(&self, record: NewInventoryRecord) -> Result<InventoryRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO inventory (product_id, warehouse_id, quantity_available, quantity_reserved, reorder_level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, warehouse_id, quantity_available, quantity_reserved,
                      reorder_level, version, created_at, updated_at
            "#,
        )
        .bind(record.product_id.as_i64())
        .bind(record.warehouse_id.map(|w| w.as_i64()))
        .bind(record.quantity_available as i32)
        .bind(record.quantity_reserved as i32)
        .bind(record.reorder_level as i32)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_record(&row)
    }

    async fn get(&self, id: InventoryId) -> Result<Option<InventoryRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_RECORD} WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_RECORD} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_RECORD} WHERE product_id = $1 ORDER BY id ASC"
        ))
        .bind(product_id.as_i64())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn find_by_pair(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_RECORD} WHERE product_id = $1 AND warehouse_id IS NOT DISTINCT FROM $2"
        ))
        .bind(product_id.as_i64())
        .bind(warehouse_id.map(|w| w.as_i64()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_low_stock(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_RECORD} WHERE quantity_available <= reorder_level ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn update(&self, record: &InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity_available = $3, quantity_reserved = $4, reorder_level = $5,
                version = version + 1, updated_at = now()
            WHERE id = $1 AND version = $2
            RETURNING id, product_id, warehouse_id, quantity_available, quantity_reserved,
                      reorder_level, version, created_at, updated_at
            "#,
        )
        .bind(record.id.as_i64())
        .bind(record.version)
        .bind(record.quantity_available as i32)
        .bind(record.quantity_reserved as i32)
        .bind(record.reorder_level as i32)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::Conflict(record.id))?;

        Self::row_to_record(&row)
    }

    async fn delete(&self, id: InventoryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// PostgreSQL-backed product catalog store.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (sku, name, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, sku, name, is_active
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.is_active)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(&row)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, sku, name, is_active FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, sku, name, is_active FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_product).collect()
    }
}
