//! # Product Actor
//!
//! The Product Authority: owns the catalog records and announces their lifecycle.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](sync_framework::ActorEntity) implementation for
//!   [`ProductRecord`](crate::model::ProductRecord), keyed by SKU
//! - [`error`] - [`ProductError`] type for type-safe error handling
//! - [`publisher`] - [`ProductEventPublisher`], the actor's context
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Published events
//!
//! | Write | Topic | Event |
//! |-------|-------|-------|
//! | create | `product.created` | `ProductCreated{sku}` |
//! | update changing the SKU | `product.updated` | `ProductRenamed{oldSku, newSku}` |
//! | delete | `product.deleted` | `ProductDeleted{sku}` |
//!
//! An update that keeps the SKU publishes nothing. Publication happens after the write is
//! stored; if it fails the write stays, and the failure is logged at `error`.
//!
//! ## Usage
//!
//! ```rust
//! use catalog_sync::clients::ProductClient;
//! use catalog_sync::model::ProductRequest;
//! use catalog_sync::product_actor::{self, ProductEventPublisher};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//! use sync_framework::channel::{ChannelConfig, DeadLetterQueue, InMemoryEventChannel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let channel = InMemoryEventChannel::new(ChannelConfig::default(), Arc::new(DeadLetterQueue::new()));
//!
//!     let (actor, generic_client) = product_actor::new(32);
//!     tokio::spawn(actor.run(ProductEventPublisher::new(Arc::new(channel))));
//!     let client = ProductClient::new(generic_client);
//!
//!     let product = client
//!         .create_product(ProductRequest {
//!             sku: "WIDGET-1".to_string(),
//!             name: "Widget".to_string(),
//!             description: "A widget".to_string(),
//!             price: Decimal::new(2999, 2),
//!             image_url: None,
//!         })
//!         .await?;
//!
//!     client.rename_product(product.id, "WIDGET-2").await?;
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;
pub mod publisher;

pub use error::*;
pub use publisher::*;

use crate::model::ProductRecord;
use sync_framework::{ResourceActor, ResourceClient};

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<ProductRecord>, ResourceClient<ProductRecord>) {
    ResourceActor::new(buffer_size)
}
