//! Type-safe wrappers around the actors' generic clients.
//!
//! - [`ProductClient`] - catalog writes and the single-SKU lookup
//! - [`InventoryClient`] - atomic store operations on inventory records, by SKU
//! - [`StockClient`] - the operator API whose writes are confirmed through the guarded lookup

pub mod inventory_client;
pub mod product_client;
pub mod stock_client;

pub use inventory_client::InventoryClient;
pub use product_client::ProductClient;
pub use stock_client::StockClient;
