//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{ApiResponse, CustomerId, Money, OrderId, ProductId, WarehouseId};
use orchestrator::{CreateOrder, CreateOrderItem, UpdateOrder};
use orders::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub warehouse_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: i64,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub items: Option<Vec<OrderItemRequest>>,
}

#[derive(Deserialize)]
pub struct StatusParams {
    pub status: String,
}

#[derive(Deserialize)]
pub struct DateRangeParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub warehouse_id: Option<i64>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub status: String,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub total_amount_cents: i64,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.as_i64(),
                warehouse_id: item.warehouse_id.map(|w| w.as_i64()),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                subtotal_cents: item.subtotal().cents(),
            })
            .collect();

        Self {
            id: order.id.as_i64(),
            customer_id: order.customer_id.as_i64(),
            status: order.status.to_string(),
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            notes: order.notes,
            total_amount_cents: order.total_amount.cents(),
            items,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

fn to_command_item(item: OrderItemRequest) -> CreateOrderItem {
    CreateOrderItem {
        product_id: ProductId::new(item.product_id),
        warehouse_id: item.warehouse_id.map(WarehouseId::new),
        product_name: item.product_name,
        quantity: item.quantity,
        unit_price: Money::from_cents(item.unit_price_cents),
    }
}

fn parse_status(status: &str) -> Result<OrderStatus, ApiError> {
    status
        .parse()
        .map_err(|e: orders::ParseStatusError| ApiError::BadRequest(e.to_string()))
}

// -- Handlers --

/// POST /api/v1/orders — run the order-creation workflow.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let cmd = CreateOrder {
        customer_id: CustomerId::new(req.customer_id),
        shipping_address: req.shipping_address,
        billing_address: req.billing_address,
        notes: req.notes,
        items: req.items.into_iter().map(to_command_item).collect(),
    };

    let order = state.orchestrator.create_order(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order created successfully",
            OrderResponse::from(order),
        )),
    ))
}

/// GET /api/v1/orders/{id} — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state.orchestrator.get_order(OrderId::new(id)).await?;
    Ok(Json(ApiResponse::success(
        "Order retrieved successfully",
        OrderResponse::from(order),
    )))
}

/// GET /api/v1/orders — list all orders.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders = state.orchestrator.list_orders().await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved successfully",
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

/// GET /api/v1/orders/customer/{customer_id} — list a customer's orders.
#[tracing::instrument(skip(state))]
pub async fn by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders = state
        .orchestrator
        .orders_for_customer(CustomerId::new(customer_id))
        .await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved successfully",
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

/// GET /api/v1/orders/customer/{customer_id}/count — count a customer's orders.
#[tracing::instrument(skip(state))]
pub async fn count_by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<ApiResponse<u64>>, ApiError> {
    let count = state
        .orchestrator
        .count_for_customer(CustomerId::new(customer_id))
        .await?;
    Ok(Json(ApiResponse::success(
        "Order count retrieved successfully",
        count,
    )))
}

/// GET /api/v1/orders/status/{status} — list orders in a status.
#[tracing::instrument(skip(state))]
pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let status = parse_status(&status)?;
    let orders = state.orchestrator.orders_with_status(status).await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved successfully",
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

/// GET /api/v1/orders/date-range?start=&end= — list orders created in a window.
#[tracing::instrument(skip(state, params))]
pub async fn between(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders = state
        .orchestrator
        .orders_between(params.start, params.end)
        .await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved successfully",
        orders.into_iter().map(OrderResponse::from).collect(),
    )))
}

/// PUT /api/v1/orders/{id} — update an order's fields and items.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let cmd = UpdateOrder {
        shipping_address: req.shipping_address,
        billing_address: req.billing_address,
        notes: req.notes,
        items: req
            .items
            .map(|items| items.into_iter().map(to_command_item).collect()),
    };

    let order = state.orchestrator.update_order(OrderId::new(id), cmd).await?;
    Ok(Json(ApiResponse::success(
        "Order updated successfully",
        OrderResponse::from(order),
    )))
}

/// PATCH /api/v1/orders/{id}/status?status= — move an order to a new status.
#[tracing::instrument(skip(state, params))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<StatusParams>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let status = parse_status(&params.status)?;
    let order = state
        .orchestrator
        .update_status(OrderId::new(id), status)
        .await?;
    Ok(Json(ApiResponse::success(
        "Order status updated successfully",
        OrderResponse::from(order),
    )))
}

/// DELETE /api/v1/orders/{id} — delete a PENDING or CANCELLED order.
#[tracing::instrument(skip(state))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.orchestrator.delete_order(OrderId::new(id)).await?;
    Ok(Json(ApiResponse::success_empty(
        "Order deleted successfully",
    )))
}
