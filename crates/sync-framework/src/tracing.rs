//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging for a whole process built on
//! this framework.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`); actors log an
//! `entity_type` field instead, and the channel and breaker log `topic` and `breaker`.
//!
//! ```bash
//! RUST_LOG=info cargo run       # lifecycle, replication progress, breaker transitions
//! RUST_LOG=debug cargo run      # every request with its payload
//! RUST_LOG=catalog_sync=debug,sync_framework=warn cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: startup, shutdown and final store size
//! - **Store Operations**: Create, Get, List, Update, Delete with the target id or key
//! - **Event Channel**: publications, retries with their backoff, dead letters (at `error`)
//! - **Circuit Breaker**: every state transition with the failure rate that caused it
//!
//! A replication run at `info` reads like this:
//!
//! ```text
//! INFO Created entity_type="ProductRecord" id=product_1 key=A1 size=1
//! INFO Subscribed topic="product.created" retained=1
//! INFO Replicated sku="A1" applied=Inserted
//! WARN Delivery failed, requeued topic="product.updated" attempt=1 backoff=100ms
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - we use entity_type instead
        .compact()
        .init();
}
