//! HTTP adapter speaking to a remote inventory service.

use std::time::Duration;

use async_trait::async_trait;
use common::{ApiResponse, ProductId, WarehouseId};
use serde::de::DeserializeOwned;

use crate::error::GatewayError;
use crate::types::{ProductInfo, StockLevel};
use crate::InventoryGateway;

/// Talks to the inventory service's HTTP API.
///
/// Connection errors, timeouts, and undecodable bodies classify as
/// [`GatewayError::Transport`]; a decoded envelope with `success = false`
/// classifies as [`GatewayError::Rejected`] carrying the service's error
/// code. The per-request timeout is the only cancellation contract.
#[derive(Clone)]
pub struct HttpInventoryGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventoryGateway {
    /// Creates a gateway against `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::unwrap_envelope(response).await
    }

    async fn patch_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        quantity: u32,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .patch(self.url(path))
            .query(&[("quantity", quantity)])
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid response body: {e}")))?;

        if envelope.success {
            envelope.data.ok_or_else(|| {
                GatewayError::Transport("success response carried no payload".to_string())
            })
        } else {
            let (code, message) = match envelope.error {
                Some(details) => (details.error_code, details.error_message),
                None => ("ERR_005".to_string(), envelope.message),
            };
            Err(GatewayError::Rejected { code, message })
        }
    }
}

#[async_trait]
impl InventoryGateway for HttpInventoryGateway {
    async fn get_product(&self, product_id: ProductId) -> Result<ProductInfo, GatewayError> {
        self.get_envelope(&format!("/api/v1/products/{product_id}"))
            .await
    }

    async fn total_available(&self, product_id: ProductId) -> Result<u32, GatewayError> {
        self.get_envelope(&format!("/api/v1/inventories/product/{product_id}/total"))
            .await
    }

    async fn available_at(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<StockLevel, GatewayError> {
        self.get_envelope(&format!(
            "/api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}"
        ))
        .await
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let path = match warehouse_id {
            Some(warehouse_id) => format!(
                "/api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}/reserve"
            ),
            None => format!("/api/v1/inventories/product/{product_id}/reserve"),
        };
        self.patch_envelope(&path, quantity).await
    }

    async fn release(
        &self,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: u32,
    ) -> Result<StockLevel, GatewayError> {
        let path = match warehouse_id {
            Some(warehouse_id) => format!(
                "/api/v1/inventories/product/{product_id}/warehouse/{warehouse_id}/release"
            ),
            None => format!("/api/v1/inventories/product/{product_id}/release"),
        };
        self.patch_envelope(&path, quantity).await
    }
}
