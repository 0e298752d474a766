//! # Sync Framework
//!
//! Building blocks for keeping records owned by separate services consistent without shared
//! storage. Three pieces work together:
//!
//! 1. **Resource actors** ([`ResourceActor`] / [`ResourceClient`]): a single Tokio task owns a
//!    store of entities plus a unique index over their natural key. Because requests are handled
//!    one at a time, "insert unless the key exists" and "update the entity holding this key" are
//!    atomic without any lock.
//! 2. **Event channel** ([`channel`]): at-least-once, unordered, concurrent topic delivery with
//!    retries and a dead-letter sink. Post-commit entity hooks publish into it.
//! 3. **Circuit breaker** ([`circuit_breaker`]): guards the one synchronous cross-service call,
//!    with a count-based window, a single half-open trial and a caller-supplied fallback.
//!
//! ## Resource actors
//!
//! An entity describes itself once through [`ActorEntity`]:
//!
//! ```rust
//! use sync_framework::{ActorEntity, FrameworkError, ResourceActor, Target};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Stock {
//!     id: u32,
//!     sku: String,
//!     quantity: u32,
//! }
//!
//! #[derive(Debug)] struct StockCreate { sku: String }
//! #[derive(Debug)] struct SetQuantity(u32);
//! #[derive(Debug, thiserror::Error)] #[error("invalid stock")] struct StockError;
//!
//! #[async_trait]
//! impl ActorEntity for Stock {
//!     type Id = u32;
//!     type Key = String;
//!     type Create = StockCreate;
//!     type Update = SetQuantity;
//!     type Context = ();
//!     type Error = StockError;
//!
//!     fn key(&self) -> &String { &self.sku }
//!
//!     fn from_create_params(id: u32, params: StockCreate) -> Result<Self, StockError> {
//!         Ok(Self { id, sku: params.sku, quantity: 0 })
//!     }
//!
//!     async fn on_update(&mut self, update: SetQuantity, _ctx: &()) -> Result<(), StockError> {
//!         self.quantity = update.0;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Stock>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     client.create(StockCreate { sku: "A1".into() }).await.unwrap();
//!
//!     // The key index refuses a second record for the same SKU
//!     let again = client.create(StockCreate { sku: "A1".into() }).await;
//!     assert!(matches!(again, Err(FrameworkError::Conflict(_))));
//!
//!     let updated = client.update(Target::Key("A1".into()), SetQuantity(7)).await.unwrap();
//!     assert_eq!(updated.quantity, 7);
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction time. An
//! entity that publishes events from its `after_*` hooks declares the publisher as its
//! `Context`, and the actor hands it to every hook:
//!
//! ```rust,ignore
//! impl ActorEntity for ProductRecord {
//!     type Context = ProductEventPublisher;
//!
//!     async fn after_create(&self, publisher: &ProductEventPublisher) -> Result<(), ProductError> {
//!         publisher.publish(ProductEvent::Created(ProductCreated { sku: self.sku.clone() })).await
//!     }
//! }
//!
//! tokio::spawn(product_actor.run(ProductEventPublisher::new(channel.clone())));
//! ```
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task and processes messages **sequentially**
//! - Event deliveries run as independent tasks, concurrently with each other
//! - The circuit breaker is shared through `Arc`; its state lives behind one mutex
//!
//! ## Testing
//!
//! - [`mock::MockClient`] answers client requests from expectations, no actor needed
//! - [`clock::ManualClock`] drives breaker timing deterministically
//! - [`channel::InMemoryEventChannel::wait_idle`] waits until every delivery has settled

pub mod actor;
pub mod channel;
pub mod circuit_breaker;
pub mod client;
pub mod client_trait;
pub mod clock;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response, Target};
