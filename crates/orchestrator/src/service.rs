//! The order orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use gateway::{GatewayError, InventoryGateway};
use orders::{NewOrder, Order, OrderItem, OrderStatus, OrderStore};

use crate::commands::{CreateOrder, CreateOrderItem, UpdateOrder};
use crate::error::{OrchestratorError, Result};

/// Drives the order-creation workflow and the order operations around it.
///
/// Creation is strictly sequential per line item: item *k+1* is not
/// validated or reserved before item *k* finished that step, because the
/// compensation path relies on an ordered "reserved so far" prefix.
/// Reservation happens before persistence, so a failed creation never
/// leaves an order row behind.
#[derive(Clone)]
pub struct OrderOrchestrator {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn InventoryGateway>,
}

impl OrderOrchestrator {
    /// Creates an orchestrator over the given order store and gateway.
    pub fn new(orders: Arc<dyn OrderStore>, gateway: Arc<dyn InventoryGateway>) -> Self {
        Self { orders, gateway }
    }

    // -- Creation saga --

    /// Creates an order: validate → check stock → reserve → persist.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        metrics::counter!("orders_created_total").increment(1);
        let started = std::time::Instant::now();
        tracing::info!(customer_id = %cmd.customer_id, "creating new order");

        if cmd.items.is_empty() {
            return Err(OrchestratorError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        let items = self.validate_items(cmd.items).await?;
        self.reserve_items(&items).await?;

        let draft = NewOrder {
            customer_id: cmd.customer_id,
            status: OrderStatus::Pending,
            shipping_address: cmd.shipping_address,
            billing_address: cmd.billing_address,
            notes: cmd.notes,
            items: items.clone(),
        };

        let order = match self.orders.insert(draft).await {
            Ok(order) => order,
            Err(err) => {
                // The reservations are already held; compensate them so a
                // failed creation leaves neither an order nor stuck stock.
                tracing::error!(error = %err, "failed to persist order, rolling back reservations");
                self.rollback_reservations(&items).await;
                return Err(err.into());
            }
        };

        metrics::histogram!("order_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created successfully");
        Ok(order)
    }

    /// Validates each item in list order: shape, product, then stock.
    ///
    /// Returns the validated items with product names backfilled from the
    /// catalog where the caller left them empty.
    async fn validate_items(&self, items: Vec<CreateOrderItem>) -> Result<Vec<OrderItem>> {
        let mut validated = Vec::with_capacity(items.len());

        for item in items {
            if item.quantity == 0 {
                return Err(OrchestratorError::Validation(format!(
                    "Invalid quantity for product ID: {}",
                    item.product_id
                )));
            }
            if item.unit_price.is_negative() {
                return Err(OrchestratorError::Validation(format!(
                    "Invalid price for product ID: {}",
                    item.product_id
                )));
            }

            let product = match self.gateway.get_product(item.product_id).await {
                Ok(product) => product,
                Err(GatewayError::Rejected { .. }) => {
                    return Err(OrchestratorError::Validation(format!(
                        "Product not found with ID: {}",
                        item.product_id
                    )));
                }
                Err(GatewayError::Transport(err)) => {
                    tracing::error!(product_id = %item.product_id, error = %err, "error validating product");
                    return Err(OrchestratorError::Validation(format!(
                        "Unable to validate product with ID: {}. Product service may be unavailable.",
                        item.product_id
                    )));
                }
            };

            if !product.is_active {
                return Err(OrchestratorError::Validation(format!(
                    "Product is not active: {}",
                    product.name
                )));
            }

            let product_name = match item.product_name {
                Some(name) if !name.trim().is_empty() => name,
                _ => product.name,
            };

            match item.warehouse_id {
                Some(warehouse_id) => {
                    match self.gateway.available_at(item.product_id, warehouse_id).await {
                        Ok(level) if level.quantity_available < item.quantity => {
                            return Err(OrchestratorError::Validation(format!(
                                "Insufficient stock for product ID: {} at warehouse ID: {}. Available: {}, Requested: {}",
                                item.product_id,
                                warehouse_id,
                                level.quantity_available,
                                item.quantity
                            )));
                        }
                        Ok(_) => {}
                        Err(err) => {
                            return Err(Self::stock_check_failure(item.product_id, &err));
                        }
                    }
                }
                None => match self.gateway.total_available(item.product_id).await {
                    Ok(available) if available < item.quantity => {
                        return Err(OrchestratorError::Validation(format!(
                            "Insufficient stock for product ID: {}. Available: {}, Requested: {}",
                            item.product_id, available, item.quantity
                        )));
                    }
                    Ok(_) => {}
                    Err(err) => {
                        return Err(Self::stock_check_failure(item.product_id, &err));
                    }
                },
            }

            validated.push(OrderItem::new(
                item.product_id,
                item.warehouse_id,
                product_name,
                item.quantity,
                item.unit_price,
            ));
        }

        Ok(validated)
    }

    fn stock_check_failure(
        product_id: common::ProductId,
        err: &GatewayError,
    ) -> OrchestratorError {
        tracing::error!(%product_id, error = %err, "error checking inventory");
        OrchestratorError::Validation(format!(
            "Unable to check inventory for product ID: {product_id}. Product service may be unavailable."
        ))
    }

    /// Reserves each item in list order. On the first failure, compensates
    /// every reservation acquired so far and fails the whole creation.
    async fn reserve_items(&self, items: &[OrderItem]) -> Result<()> {
        for (index, item) in items.iter().enumerate() {
            match self
                .gateway
                .reserve(item.product_id, item.warehouse_id, item.quantity)
                .await
            {
                Ok(_) => {
                    tracing::info!(
                        product_id = %item.product_id,
                        warehouse_id = ?item.warehouse_id,
                        quantity = item.quantity,
                        "inventory reserved"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        reserved = index,
                        "error reserving inventory, rolling back reservations"
                    );
                    metrics::counter!("order_reservation_failures_total").increment(1);
                    self.rollback_reservations(&items[..index]).await;
                    return Err(OrchestratorError::Internal(format!(
                        "Failed to reserve inventory: {err}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Releases each reserved item in acquisition order. Failures are logged
    /// and swallowed so one bad release never blocks the rest.
    async fn rollback_reservations(&self, reserved: &[OrderItem]) {
        for item in reserved {
            if let Err(err) = self
                .gateway
                .release(item.product_id, item.warehouse_id, item.quantity)
                .await
            {
                tracing::error!(
                    product_id = %item.product_id,
                    warehouse_id = ?item.warehouse_id,
                    error = %err,
                    "failed to roll back inventory reservation"
                );
            }
        }
    }

    // -- Queries --

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or(OrchestratorError::OrderNotFound(id))
    }

    /// Returns all orders.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.list().await?)
    }

    /// Returns the orders placed by a customer.
    pub async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_customer(customer_id).await?)
    }

    /// Returns the orders currently in a status.
    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_status(status).await?)
    }

    /// Returns the orders created within `[start, end]`.
    pub async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>> {
        Ok(self.orders.find_between(start, end).await?)
    }

    /// Counts the orders placed by a customer.
    pub async fn count_for_customer(&self, customer_id: CustomerId) -> Result<u64> {
        Ok(self.orders.count_by_customer(customer_id).await?)
    }

    // -- Mutations --

    /// Updates an order's addresses, notes, and optionally its items.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn update_order(&self, id: OrderId, cmd: UpdateOrder) -> Result<Order> {
        tracing::info!(order_id = %id, "updating order");
        let mut order = self.get_order(id).await?;

        if !order.status.can_update() {
            return Err(OrchestratorError::CannotUpdate(order.status));
        }

        order.shipping_address = cmd.shipping_address;
        order.billing_address = cmd.billing_address;
        order.notes = cmd.notes;

        if let Some(items) = cmd.items {
            if !items.is_empty() {
                let items = items
                    .into_iter()
                    .map(|item| {
                        OrderItem::new(
                            item.product_id,
                            item.warehouse_id,
                            item.product_name.unwrap_or_default(),
                            item.quantity,
                            item.unit_price,
                        )
                    })
                    .collect();
                order.replace_items(items);
            }
        }

        Ok(self.orders.update(&order).await?)
    }

    /// Moves an order to a new status.
    ///
    /// Transitioning into CANCELLED releases the order's reservations,
    /// best-effort per item, before the status write.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        tracing::info!(order_id = %id, %status, "updating order status");
        let mut order = self.get_order(id).await?;

        if !order.status.can_transition_to(status) {
            return Err(OrchestratorError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        if status == OrderStatus::Cancelled {
            self.release_order_inventory(&order).await;
            metrics::counter!("orders_cancelled_total").increment(1);
        }

        order.status = status;
        Ok(self.orders.update(&order).await?)
    }

    /// Deletes an order. Only PENDING and CANCELLED orders may be deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<()> {
        tracing::info!(order_id = %id, "deleting order");
        let order = self.get_order(id).await?;

        if !order.status.can_delete() {
            return Err(OrchestratorError::CannotDelete(order.status));
        }

        Ok(self.orders.delete(order.id).await?)
    }

    /// Releases every item's reservation, logging and continuing on failure.
    async fn release_order_inventory(&self, order: &Order) {
        for item in &order.items {
            match self
                .gateway
                .release(item.product_id, item.warehouse_id, item.quantity)
                .await
            {
                Ok(_) => {
                    tracing::info!(
                        product_id = %item.product_id,
                        warehouse_id = ?item.warehouse_id,
                        quantity = item.quantity,
                        "inventory released"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        product_id = %item.product_id,
                        warehouse_id = ?item.warehouse_id,
                        error = %err,
                        "failed to release inventory, manual intervention may be required"
                    );
                }
            }
        }
    }
}
