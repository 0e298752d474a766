//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract that every record (Product, Inventory, …) must
//! implement to be managed by the generic `ResourceActor`. It specifies associated types for IDs,
//! the unique natural key, DTOs, context and errors, and provides lifecycle hooks
//! (`on_update` before a write, `after_create` / `after_update` / `after_delete` once it committed).
//!
//! # Architecture Note
//! By defining a contract (`ActorEntity`) that all our record types must satisfy, we write the
//! `ResourceActor` logic *once* and reuse it everywhere.
//!
//! We use "Associated Types" (type Id, type Key, type Create, etc.) to enforce type safety.
//! A `ProductRecord` requires a `ProductRequest` payload, and you can't accidentally send it
//! an `InventoryCreate` payload.
//!
//! # Unique Keys
//! Every entity exposes a natural key (e.g. a SKU) through [`ActorEntity::key`]. The actor keeps
//! a secondary index on it and refuses any create or update that would give two entities the same
//! key. Since the actor processes one message at a time, this check-then-write is atomic: it is the
//! store's uniqueness constraint.
//!
//! # Provided Methods (Hooks)
//! The post-commit hooks have default implementations that do nothing (`Ok(())`):
//! - [`ActorEntity::after_create`]
//! - [`ActorEntity::after_update`]
//! - [`ActorEntity::after_delete`]

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g. publishing an
/// event). It also defines a `Context` type, which is injected into every hook. This allows
/// "Late Binding" of dependencies (passing them to `run()` instead of `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The store-assigned identifier for this entity.
    /// Must be convertible from u32 for automatic ID generation.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The natural key, unique across all entities held by one actor.
    type Key: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// The framework boxes it into [`FrameworkError::EntityError`](crate::FrameworkError::EntityError);
    /// clients recover it with [`FrameworkError::downcast_entity`](crate::FrameworkError::downcast_entity).
    type Error: std::error::Error + Send + Sync + 'static;

    /// The natural key of this entity.
    fn key(&self) -> &Self::Key;

    /// Construct the full Entity from the ID and Payload.
    /// Validation of the payload belongs here; nothing is stored when it fails.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Apply an update request.
    ///
    /// The actor runs this on a copy of the stored entity; the copy only replaces the original
    /// when the hook succeeds and the (possibly changed) key is still unique.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Post-commit Hooks (Async) ---

    /// Called once the new entity is stored.
    async fn after_create(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once an update is stored. `previous` is the state before the update.
    async fn after_update(&self, _previous: &Self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once the entity has been removed from the store.
    async fn after_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }
}
