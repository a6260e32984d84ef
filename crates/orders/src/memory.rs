use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order};
use crate::status::OrderStatus;
use crate::store::OrderStore;

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    next_id: i64,
}

/// In-memory order store.
///
/// Provides the same interface as the PostgreSQL implementation; used as the
/// default store and in tests.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

fn sorted_by_id(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by_key(|o| o.id);
    orders
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<Order> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let stored = Order {
            id: OrderId::new(inner.next_id),
            customer_id: order.customer_id,
            status: order.status,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            notes: order.notes,
            total_amount: order.items.iter().map(|i| i.subtotal()).sum(),
            items: order.items,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(inner.orders.values().cloned().collect()))
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner
                .orders
                .values()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner
                .orders
                .values()
                .filter(|o| o.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn find_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(sorted_by_id(
            inner
                .orders
                .values()
                .filter(|o| o.created_at >= start && o.created_at <= end)
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let mut inner = self.inner.write().await;
        if !inner.orders.contains_key(&order.id) {
            return Err(StoreError::NotFound(order.id));
        }
        let mut updated = order.clone();
        updated.updated_at = Utc::now();
        inner.orders.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn count_by_customer(&self, customer_id: CustomerId) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .count() as u64)
    }
}
