//! Inventory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{ApiResponse, InventoryId, ProductId, WarehouseId};
use inventory::{InventoryChanges, InventoryRecord, NewInventoryRecord};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

fn default_reorder_level() -> u32 {
    10
}

#[derive(Deserialize)]
pub struct CreateInventoryRequest {
    pub product_id: i64,
    pub warehouse_id: Option<i64>,
    #[serde(default)]
    pub quantity_available: u32,
    #[serde(default)]
    pub quantity_reserved: u32,
    #[serde(default = "default_reorder_level")]
    pub reorder_level: u32,
}

#[derive(Deserialize)]
pub struct UpdateInventoryRequest {
    pub quantity_available: u32,
    pub quantity_reserved: u32,
    pub reorder_level: u32,
}

#[derive(Deserialize)]
pub struct QuantityParams {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct AdjustParams {
    pub quantity: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct InventoryResponse {
    pub id: i64,
    pub product_id: i64,
    pub warehouse_id: Option<i64>,
    pub quantity_available: u32,
    pub quantity_reserved: u32,
    pub reorder_level: u32,
    pub total_quantity: u32,
    pub is_low_stock: bool,
}

impl From<InventoryRecord> for InventoryResponse {
    fn from(record: InventoryRecord) -> Self {
        Self {
            id: record.id.as_i64(),
            product_id: record.product_id.as_i64(),
            warehouse_id: record.warehouse_id.map(|w| w.as_i64()),
            quantity_available: record.quantity_available,
            quantity_reserved: record.quantity_reserved,
            reorder_level: record.reorder_level,
            total_quantity: record.total_quantity(),
            is_low_stock: record.is_low_stock(),
        }
    }
}

fn require_positive(quantity: u32) -> Result<u32, ApiError> {
    if quantity == 0 {
        return Err(ApiError::BadRequest(
            "Quantity must be greater than zero".to_string(),
        ));
    }
    Ok(quantity)
}

// -- Handlers --

/// POST /api/v1/inventories — provision stock for a product/warehouse pair.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryResponse>>), ApiError> {
    let record = state
        .allocation
        .create_inventory(NewInventoryRecord {
            product_id: ProductId::new(req.product_id),
            warehouse_id: req.warehouse_id.map(WarehouseId::new),
            quantity_available: req.quantity_available,
            quantity_reserved: req.quantity_reserved,
            reorder_level: req.reorder_level,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Inventory created successfully",
            InventoryResponse::from(record),
        )),
    ))
}

/// GET /api/v1/inventories/{id} — load a record by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let record = state.allocation.get_inventory(InventoryId::new(id)).await?;
    Ok(Json(ApiResponse::success(
        "Inventory retrieved successfully",
        InventoryResponse::from(record),
    )))
}

/// GET /api/v1/inventories — list all records.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<InventoryResponse>>>, ApiError> {
    let records = state.allocation.list_inventories().await?;
    Ok(Json(ApiResponse::success(
        "Inventories retrieved successfully",
        records.into_iter().map(InventoryResponse::from).collect(),
    )))
}

/// GET /api/v1/inventories/product/{product_id} — list a product's records.
#[tracing::instrument(skip(state))]
pub async fn by_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<InventoryResponse>>>, ApiError> {
    let records = state
        .allocation
        .inventories_for_product(ProductId::new(product_id))
        .await?;
    Ok(Json(ApiResponse::success(
        "Product inventories retrieved successfully",
        records.into_iter().map(InventoryResponse::from).collect(),
    )))
}

/// GET /api/v1/inventories/low-stock — list records at or below reorder level.
#[tracing::instrument(skip(state))]
pub async fn low_stock(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<InventoryResponse>>>, ApiError> {
    let records = state.allocation.low_stock().await?;
    Ok(Json(ApiResponse::success(
        "Low stock inventories retrieved successfully",
        records.into_iter().map(InventoryResponse::from).collect(),
    )))
}

/// GET /api/v1/inventories/product/{product_id}/total — total available units.
#[tracing::instrument(skip(state))]
pub async fn total(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<u32>>, ApiError> {
    let total = state
        .allocation
        .total_available(ProductId::new(product_id))
        .await?;
    Ok(Json(ApiResponse::success(
        "Total quantity retrieved successfully",
        total,
    )))
}

/// GET /api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}.
#[tracing::instrument(skip(state))]
pub async fn at_warehouse(
    State(state): State<Arc<AppState>>,
    Path((product_id, warehouse_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let record = state
        .allocation
        .available_at(ProductId::new(product_id), WarehouseId::new(warehouse_id))
        .await?;
    Ok(Json(ApiResponse::success(
        "Inventory retrieved successfully",
        InventoryResponse::from(record),
    )))
}

/// PUT /api/v1/inventories/{id} — overwrite counters and reorder level.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInventoryRequest>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let record = state
        .allocation
        .update_inventory(
            InventoryId::new(id),
            InventoryChanges {
                quantity_available: req.quantity_available,
                quantity_reserved: req.quantity_reserved,
                reorder_level: req.reorder_level,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(
        "Inventory updated successfully",
        InventoryResponse::from(record),
    )))
}

/// PATCH /api/v1/inventories/{id}/adjust?quantity= — apply a signed delta.
#[tracing::instrument(skip(state, params))]
pub async fn adjust(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<AdjustParams>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let record = state
        .allocation
        .adjust(InventoryId::new(id), params.quantity)
        .await?;
    Ok(Json(ApiResponse::success(
        "Inventory quantity adjusted successfully",
        InventoryResponse::from(record),
    )))
}

/// PATCH /api/v1/inventories/product/{product_id}/reserve?quantity=.
#[tracing::instrument(skip(state, params))]
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Query(params): Query<QuantityParams>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let quantity = require_positive(params.quantity)?;
    let record = state
        .allocation
        .reserve(ProductId::new(product_id), quantity)
        .await?;
    Ok(Json(ApiResponse::success(
        "Quantity reserved successfully",
        InventoryResponse::from(record),
    )))
}

/// PATCH /api/v1/inventories/product/{product_id}/release?quantity=.
#[tracing::instrument(skip(state, params))]
pub async fn release(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Query(params): Query<QuantityParams>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let quantity = require_positive(params.quantity)?;
    let record = state
        .allocation
        .release(ProductId::new(product_id), quantity)
        .await?;
    Ok(Json(ApiResponse::success(
        "Reserved quantity released successfully",
        InventoryResponse::from(record),
    )))
}

/// PATCH /api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}/reserve.
#[tracing::instrument(skip(state, params))]
pub async fn reserve_at_warehouse(
    State(state): State<Arc<AppState>>,
    Path((product_id, warehouse_id)): Path<(i64, i64)>,
    Query(params): Query<QuantityParams>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let quantity = require_positive(params.quantity)?;
    let record = state
        .allocation
        .reserve_at(
            ProductId::new(product_id),
            WarehouseId::new(warehouse_id),
            quantity,
        )
        .await?;
    Ok(Json(ApiResponse::success(
        "Quantity reserved successfully",
        InventoryResponse::from(record),
    )))
}

/// PATCH /api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}/release.
#[tracing::instrument(skip(state, params))]
pub async fn release_at_warehouse(
    State(state): State<Arc<AppState>>,
    Path((product_id, warehouse_id)): Path<(i64, i64)>,
    Query(params): Query<QuantityParams>,
) -> Result<Json<ApiResponse<InventoryResponse>>, ApiError> {
    let quantity = require_positive(params.quantity)?;
    let record = state
        .allocation
        .release_at(
            ProductId::new(product_id),
            WarehouseId::new(warehouse_id),
            quantity,
        )
        .await?;
    Ok(Json(ApiResponse::success(
        "Reserved quantity released successfully",
        InventoryResponse::from(record),
    )))
}

/// DELETE /api/v1/inventories/{id} — delete a record.
#[tracing::instrument(skip(state))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .allocation
        .delete_inventory(InventoryId::new(id))
        .await?;
    Ok(Json(ApiResponse::success_empty(
        "Inventory deleted successfully",
    )))
}
