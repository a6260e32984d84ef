//! Inventory allocation engine.
//!
//! Stock lives in per-`(product, warehouse)` [`InventoryRecord`]s tracking
//! available and reserved quantities. The [`AllocationService`] owns the
//! reservation contract: reserve moves units from available to reserved,
//! release moves them back, and `available + reserved` is conserved across
//! matched pairs. Records carry a row version; every mutation is a
//! compare-and-swap through [`InventoryStore::update`], retried on conflict,
//! so concurrent callers serialize per record.
//!
//! A minimal product catalog rides along because reservation callers need to
//! resolve and validate products through the same service.

mod catalog;
mod error;
mod memory;
mod postgres;
mod record;
mod service;
mod store;

pub use catalog::{NewProduct, Product, ProductStore};
pub use error::{InventoryError, Result, StoreError};
pub use memory::{InMemoryInventoryStore, InMemoryProductStore};
pub use postgres::{PostgresInventoryStore, PostgresProductStore};
pub use record::{InventoryChanges, InventoryRecord, NewInventoryRecord};
pub use service::AllocationService;
pub use store::InventoryStore;
