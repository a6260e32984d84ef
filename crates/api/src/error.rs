//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ApiResponse;
use inventory::InventoryError;
use orchestrator::OrchestratorError;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as an [`ApiResponse`] failure envelope carrying the
/// component's stable error code.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (unparseable parameter, bad shape).
    BadRequest(String),
    /// Orchestrator error.
    Orchestrator(OrchestratorError),
    /// Allocation engine error.
    Inventory(InventoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "ERR_004", msg),
            ApiError::Orchestrator(err) => orchestrator_error_to_response(err),
            ApiError::Inventory(err) => inventory_error_to_response(err),
        };

        let body: ApiResponse<()> = ApiResponse::error(code, message);
        (status, Json(body)).into_response()
    }
}

fn orchestrator_error_to_response(err: OrchestratorError) -> (StatusCode, &'static str, String) {
    let status = match &err {
        OrchestratorError::Validation(_) => StatusCode::BAD_REQUEST,
        OrchestratorError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrchestratorError::CannotUpdate(_)
        | OrchestratorError::CannotDelete(_)
        | OrchestratorError::InvalidTransition { .. } => StatusCode::CONFLICT,
        OrchestratorError::Internal(_) | OrchestratorError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.code(), err.to_string())
}

fn inventory_error_to_response(err: InventoryError) -> (StatusCode, &'static str, String) {
    let status = match &err {
        InventoryError::ProductNotFound(_)
        | InventoryError::RecordNotFound(_)
        | InventoryError::NoRecordForWarehouse { .. } => StatusCode::NOT_FOUND,
        InventoryError::InsufficientStock { .. }
        | InventoryError::InvalidRelease { .. }
        | InventoryError::ReleaseShortfall { .. }
        | InventoryError::DuplicateRecord { .. } => StatusCode::CONFLICT,
        InventoryError::Store(_) => {
            tracing::error!(error = %err, "internal server error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.code(), err.to_string())
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError::Orchestrator(err)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}
