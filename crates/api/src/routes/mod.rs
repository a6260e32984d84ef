pub mod health;
pub mod inventories;
pub mod metrics;
pub mod orders;
pub mod products;
