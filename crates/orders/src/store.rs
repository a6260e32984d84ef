use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};

use crate::error::Result;
use crate::order::{NewOrder, Order};
use crate::status::OrderStatus;

/// Persistence boundary for orders.
///
/// Implementations must be thread-safe. Items are stored and deleted with
/// their order; an item row never outlives its order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order, assigning its ID and timestamps.
    async fn insert(&self, order: NewOrder) -> Result<Order>;

    /// Loads an order with its items. Returns `None` when absent.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns all orders.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Returns all orders placed by the given customer.
    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// Returns all orders currently in the given status.
    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>>;

    /// Returns orders created within `[start, end]`.
    async fn find_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>>;

    /// Overwrites an existing order (fields and items), bumping `updated_at`.
    ///
    /// Fails with `NotFound` when the order does not exist.
    async fn update(&self, order: &Order) -> Result<Order>;

    /// Deletes an order and its items. Fails with `NotFound` when absent.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Counts the orders placed by the given customer.
    async fn count_by_customer(&self, customer_id: CustomerId) -> Result<u64>;
}
