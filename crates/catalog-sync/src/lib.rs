//! # Catalog Sync
//!
//! A product catalog (the Product Authority) and a store inventory kept in step by events.
//!
//! Product writes publish `ProductCreated`, `ProductRenamed` and `ProductDeleted` after they
//! commit. The inventory replica applies them idempotently, so duplicated, replayed or reordered
//! deliveries converge on the same records. Operator writes to stock quantities are confirmed with
//! the Product Authority through a circuit-breaker-guarded lookup.
//!
//! - [`model`] - records, payloads and events
//! - [`product_actor`] / [`inventory_actor`] - the two stores, as
//!   [`ResourceActor`](sync_framework::ResourceActor)s
//! - [`clients`] - typed clients, including the guarded [`StockClient`](clients::StockClient)
//! - [`lookup`] - the product lookup and its breaker
//! - [`replication`] - the event consumer
//! - [`config`] - runtime configuration
//! - [`lifecycle`] - starting and stopping everything

pub mod clients;
pub mod config;
pub mod inventory_actor;
pub mod lifecycle;
pub mod lookup;
pub mod model;
pub mod product_actor;
pub mod replication;
