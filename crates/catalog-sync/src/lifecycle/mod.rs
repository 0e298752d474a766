//! # System Lifecycle & Orchestration
//!
//! Starts, wires and stops the two services of the catalog.
//!
//! ## Wiring
//!
//! ```text
//!  ProductClient ──► product actor ──after_* hooks──► ProductEventPublisher
//!        ▲                                                   │ publish
//!        │ fetch_product_by_sku                              ▼
//!  CatalogLookup ◄── GuardedLookup ◄── StockClient     InMemoryEventChannel
//!                    (circuit breaker)      │                │ deliver / retry / dead-letter
//!                                           ▼                ▼
//!                                   inventory actor ◄── ReplicationHandler
//! ```
//!
//! 1. **Actor creation** - both actors and their clients, buffer size from [`SyncConfig`]
//! 2. **Context injection** - the product actor runs with the publisher; the inventory actor needs
//!    nothing
//! 3. **Consumer wiring** - the replica subscribes to all product topics; events published before
//!    this point are retained by the channel and replayed
//! 4. **Graceful shutdown** - channel first, then clients, then actor tasks
//!
//! [`SyncConfig`]: crate::config::SyncConfig

mod catalog_system;

pub use catalog_system::{CatalogSystem, SystemError, PRODUCT_LOOKUP_BREAKER};
