//! Order orchestration.
//!
//! [`OrderOrchestrator`] drives the order-creation workflow across two
//! independently owned resources (the order store and the inventory
//! service) without a shared transaction. Creation validates every line
//! item, reserves stock item by item through the gateway, compensates
//! already-acquired reservations when a later one fails, and only then
//! persists the order. Cancellation releases the order's reservations
//! best-effort before the status write.

mod commands;
mod error;
mod service;

pub use commands::{CreateOrder, CreateOrderItem, UpdateOrder};
pub use error::{OrchestratorError, Result};
pub use service::OrderOrchestrator;
