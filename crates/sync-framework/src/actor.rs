//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the core component that manages the lifecycle
//! and state of entities. It implements the "Server" side of the Actor Model, processing
//! messages sequentially and ensuring exclusive access to the entity store.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Target};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The generic actor that manages a collection of entities.
///
/// The `ResourceActor<T>` struct is the *server* side of the framework. It owns the in-memory
/// store for a given entity type `T: ActorEntity`, a unique index over [`ActorEntity::key`], and
/// processes all incoming `ResourceRequest<T>` messages sequentially. Each actor runs in its own
/// Tokio task, so every request observes and mutates the store atomically without any locking.
///
/// * **Uniqueness** – at most one entity per key; creates and key-changing updates that would
///   break this are answered with [`FrameworkError::Conflict`].
/// * **Context injection** – a user-provided `Context` is passed to every hook.
/// * **Post-commit hooks** – `after_*` hooks run once the store has been mutated.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies into `actor.run(context)`.
/// 3.  **Run**: Spawn the actor's run loop in a background task.
///
/// ```rust
/// use sync_framework::{ActorEntity, ResourceActor, Target};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Item { id: u32, code: String }
/// #[derive(Debug)] struct ItemCreate { code: String }
/// #[derive(Debug)] struct ItemUpdate;
/// #[derive(Debug, thiserror::Error)] #[error("item error")] struct ItemError;
///
/// #[async_trait]
/// impl ActorEntity for Item {
///     type Id = u32;
///     type Key = String;
///     type Create = ItemCreate;
///     type Update = ItemUpdate;
///     type Context = ();
///     type Error = ItemError;
///
///     fn key(&self) -> &String { &self.code }
///     fn from_create_params(id: u32, p: ItemCreate) -> Result<Self, ItemError> {
///         Ok(Self { id, code: p.code })
///     }
///     async fn on_update(&mut self, _: ItemUpdate, _: &()) -> Result<(), ItemError> { Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Item>::new(10);
///     tokio::spawn(actor.run(()));
///
///     client.create(ItemCreate { code: "A1".into() }).await.unwrap();
///     let found = client.get(Target::Key("A1".into())).await.unwrap();
///     assert!(found.is_some());
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    index: HashMap<T::Key, T::Id>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            index: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This allows entities
    /// to access external dependencies (like an event publisher) that were created *after*
    /// the actor was instantiated but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "ProductRecord" instead of the full path)
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = self.create(params, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { target, respond_to } => {
                    let item = self.resolve(&target).and_then(|id| self.store.get(&id)).cloned();
                    debug!(entity_type, %target, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    target,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %target, ?update, "Update");
                    let result = self.update(&target, update, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { target, respond_to } => {
                    debug!(entity_type, %target, "Delete");
                    let result = self.delete(&target, &context, entity_type).await;
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    fn resolve(&self, target: &Target<T>) -> Option<T::Id> {
        match target {
            Target::Id(id) => self.store.contains_key(id).then(|| id.clone()),
            Target::Key(key) => self.index.get(key).cloned(),
        }
    }

    async fn create(
        &mut self,
        params: T::Create,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        let id = T::Id::from(self.next_id);
        let item = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, error = %e, "Create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;

        let key = item.key().clone();
        if self.index.contains_key(&key) {
            debug!(entity_type, %key, "Key already in use");
            return Err(FrameworkError::Conflict(key.to_string()));
        }

        self.next_id += 1;
        self.index.insert(key.clone(), id.clone());
        self.store.insert(id.clone(), item.clone());
        info!(entity_type, %id, %key, size = self.store.len(), "Created");

        if let Err(e) = item.after_create(context).await {
            error!(entity_type, %id, error = %e, "after_create failed; write stays committed");
        }
        Ok(item)
    }

    async fn update(
        &mut self,
        target: &Target<T>,
        update: T::Update,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        let Some(id) = self.resolve(target) else {
            debug!(entity_type, %target, "Not found");
            return Err(FrameworkError::NotFound(target.to_string()));
        };
        let Some(previous) = self.store.get(&id).cloned() else {
            return Err(FrameworkError::NotFound(target.to_string()));
        };

        let mut next = previous.clone();
        if let Err(e) = next.on_update(update, context).await {
            warn!(entity_type, %id, error = %e, "Update failed");
            return Err(FrameworkError::EntityError(Box::new(e)));
        }

        let old_key = previous.key();
        let new_key = next.key();
        if new_key != old_key {
            if let Some(owner) = self.index.get(new_key) {
                if *owner != id {
                    debug!(entity_type, %id, key = %new_key, "Key already in use");
                    return Err(FrameworkError::Conflict(new_key.to_string()));
                }
            }
            self.index.remove(old_key);
            self.index.insert(new_key.clone(), id.clone());
        }
        self.store.insert(id.clone(), next.clone());
        info!(entity_type, %id, key = %new_key, "Updated");

        if let Err(e) = next.after_update(&previous, context).await {
            error!(entity_type, %id, error = %e, "after_update failed; write stays committed");
        }
        Ok(next)
    }

    async fn delete(
        &mut self,
        target: &Target<T>,
        context: &T::Context,
        entity_type: &str,
    ) -> Result<T, FrameworkError> {
        let Some(removed) = self.resolve(target).and_then(|id| self.store.remove(&id)) else {
            debug!(entity_type, %target, "Not found");
            return Err(FrameworkError::NotFound(target.to_string()));
        };
        self.index.remove(removed.key());
        info!(entity_type, key = %removed.key(), size = self.store.len(), "Deleted");

        if let Err(e) = removed.after_delete(context).await {
            error!(entity_type, key = %removed.key(), error = %e, "after_delete failed; write stays committed");
        }
        Ok(removed)
    }
}
