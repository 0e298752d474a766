//! # Inventory Actor
//!
//! Store of derived stock records, at most one per SKU.
//!
//! - [`entity`] - [`ActorEntity`](sync_framework::ActorEntity) implementation for
//!   [`InventoryRecord`](crate::model::InventoryRecord)
//! - [`error`] - [`InventoryError`]
//!
//! The actor has no dependencies (`Context = ()`): replication and the guarded write path are
//! driven from clients, so a slow product lookup never blocks the store.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::InventoryRecord;
use sync_framework::{ResourceActor, ResourceClient};

/// Creates a new Inventory actor and its client.
pub fn new(
    buffer_size: usize,
) -> (ResourceActor<InventoryRecord>, ResourceClient<InventoryRecord>) {
    ResourceActor::new(buffer_size)
}
