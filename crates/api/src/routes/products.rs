//! Minimal product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ApiResponse, ProductId};
use inventory::{NewProduct, Product};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub is_active: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            sku: product.sku,
            name: product.name,
            is_active: product.is_active,
        }
    }
}

/// POST /api/v1/products — register a product.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ApiError> {
    let product = state
        .allocation
        .register_product(NewProduct {
            sku: req.sku,
            name: req.name,
            is_active: req.is_active,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Product created successfully",
            ProductResponse::from(product),
        )),
    ))
}

/// GET /api/v1/products/{id} — load a product by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let product = state.allocation.get_product(ProductId::new(id)).await?;
    Ok(Json(ApiResponse::success(
        "Product retrieved successfully",
        ProductResponse::from(product),
    )))
}

/// GET /api/v1/products — list all products.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>, ApiError> {
    let products = state.allocation.list_products().await?;
    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        products.into_iter().map(ProductResponse::from).collect(),
    )))
}
