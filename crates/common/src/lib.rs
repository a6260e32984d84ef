//! Shared types used across the order and inventory crates.
//!
//! Identifiers are thin newtypes over the numeric database keys, so that an
//! order ID can never be passed where a product ID is expected. `Money` keeps
//! amounts in integer cents. `ApiResponse` is the success/error envelope that
//! every HTTP response (and the HTTP gateway client) speaks.

mod ids;
mod money;
mod response;

pub use ids::{CustomerId, InventoryId, OrderId, ProductId, WarehouseId};
pub use money::Money;
pub use response::{ApiResponse, ErrorDetails};
