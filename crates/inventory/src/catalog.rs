//! Minimal product catalog.
//!
//! Just enough product data for reservation callers to validate items:
//! identity, display name, and whether the product is still sellable. Full
//! product attribute management lives elsewhere.

use async_trait::async_trait;
use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A sellable product known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub is_active: bool,
}

/// A product that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub is_active: bool,
}

/// Persistence boundary for the product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product, assigning its ID.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Loads a product by ID. Returns `None` when absent.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Returns all products.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}
