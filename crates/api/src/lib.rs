//! HTTP API server for the order and inventory services.
//!
//! Exposes order operations, inventory allocation, and a minimal product
//! catalog behind one Axum router, with structured logging (tracing) and
//! Prometheus metrics. Stores default to in-memory and switch to PostgreSQL
//! when a `DATABASE_URL` is configured.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use gateway::DirectInventoryGateway;
use inventory::{
    AllocationService, InMemoryInventoryStore, InMemoryProductStore, PostgresInventoryStore,
    PostgresProductStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::OrderOrchestrator;
use orders::{InMemoryOrderStore, PostgresOrderStore};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: OrderOrchestrator,
    pub allocation: AllocationService,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1/orders", order_routes())
        .nest("/api/v1/inventories", inventory_routes())
        .nest("/api/v1/products", product_routes())
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

fn order_routes() -> Router<Arc<AppState>> {
    use crate::routes::orders;

    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route(
            "/{id}",
            get(orders::get).put(orders::update).delete(orders::remove),
        )
        .route("/{id}/status", patch(orders::update_status))
        .route("/customer/{customer_id}", get(orders::by_customer))
        .route(
            "/customer/{customer_id}/count",
            get(orders::count_by_customer),
        )
        .route("/status/{status}", get(orders::by_status))
        .route("/date-range", get(orders::between))
}

fn inventory_routes() -> Router<Arc<AppState>> {
    use crate::routes::inventories;

    Router::new()
        .route("/", post(inventories::create).get(inventories::list))
        .route(
            "/{id}",
            get(inventories::get)
                .put(inventories::update)
                .delete(inventories::remove),
        )
        .route("/{id}/adjust", patch(inventories::adjust))
        .route("/low-stock", get(inventories::low_stock))
        .route("/product/{product_id}", get(inventories::by_product))
        .route("/product/{product_id}/total", get(inventories::total))
        .route("/product/{product_id}/reserve", patch(inventories::reserve))
        .route("/product/{product_id}/release", patch(inventories::release))
        .route(
            "/product/{product_id}/warehouse/{warehouse_id}",
            get(inventories::at_warehouse),
        )
        .route(
            "/product/{product_id}/warehouse/{warehouse_id}/reserve",
            patch(inventories::reserve_at_warehouse),
        )
        .route(
            "/product/{product_id}/warehouse/{warehouse_id}/release",
            patch(inventories::release_at_warehouse),
        )
}

fn product_routes() -> Router<Arc<AppState>> {
    use crate::routes::products;

    Router::new()
        .route("/", post(products::create).get(products::list))
        .route("/{id}", get(products::get))
}

/// Creates application state over in-memory stores.
pub fn create_default_state() -> Arc<AppState> {
    let allocation = AllocationService::new(
        Arc::new(InMemoryInventoryStore::new()),
        Arc::new(InMemoryProductStore::new()),
    );
    let gateway = DirectInventoryGateway::new(allocation.clone());
    let orchestrator = OrderOrchestrator::new(
        Arc::new(InMemoryOrderStore::new()),
        Arc::new(gateway),
    );

    Arc::new(AppState {
        orchestrator,
        allocation,
    })
}

/// Creates application state over PostgreSQL stores sharing one pool.
pub fn create_postgres_state(pool: PgPool) -> Arc<AppState> {
    let allocation = AllocationService::new(
        Arc::new(PostgresInventoryStore::new(pool.clone())),
        Arc::new(PostgresProductStore::new(pool.clone())),
    );
    let gateway = DirectInventoryGateway::new(allocation.clone());
    let orchestrator = OrderOrchestrator::new(
        Arc::new(PostgresOrderStore::new(pool)),
        Arc::new(gateway),
    );

    Arc::new(AppState {
        orchestrator,
        allocation,
    })
}
