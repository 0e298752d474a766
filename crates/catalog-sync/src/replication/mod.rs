//! # Inventory Replication
//!
//! Keeps the SKU set of the inventory store converging on the SKU set of the catalog.
//!
//! - [`replica`] - [`InventoryReplica`], idempotent `on_created` / `on_renamed` / `on_deleted`
//! - [`handler`] - [`ReplicationHandler`], the [`EventHandler`](sync_framework::channel::EventHandler)
//!   that decodes deliveries and tells the channel whether a failure is worth retrying
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | malformed payload, blank SKU | rejected, dead-lettered on first attempt |
//! | rename before create | transient, redelivered with backoff |
//! | rename onto a SKU still held by another record | transient |
//! | store unreachable | transient |
//! | handler panic | transient (caught by the channel) |

pub mod handler;
pub mod replica;

pub use handler::*;
pub use replica::*;
