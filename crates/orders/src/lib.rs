//! Order aggregate and persistence.
//!
//! An [`Order`] exclusively owns its [`OrderItem`]s and keeps `total_amount`
//! equal to the sum of the item subtotals. The [`OrderStatus`] state machine
//! guards updates, deletes, and status transitions. Persistence goes through
//! the [`OrderStore`] trait with in-memory and PostgreSQL implementations.

mod error;
mod memory;
mod order;
mod postgres;
mod status;
mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use order::{NewOrder, Order, OrderItem};
pub use postgres::PostgresOrderStore;
pub use status::{OrderStatus, ParseStatusError};
pub use store::OrderStore;
