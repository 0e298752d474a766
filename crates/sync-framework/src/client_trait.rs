//! # ActorClient Trait
//!
//! Provides a common interface for record-specific clients, adding default `get`, `list` and
//! `delete` methods built on top of a generic `ResourceClient`.
use crate::{ActorEntity, FrameworkError, ResourceClient, Target};
use async_trait::async_trait;

/// Trait for record-specific clients to inherit standard operations.
///
/// # Example
///
/// ```rust
/// use sync_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient, Target};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Item { id: u32, code: String }
/// #[derive(Debug)] struct ItemCreate;
/// #[derive(Debug)] struct ItemUpdate;
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct ItemError(String);
///
/// #[async_trait]
/// impl ActorEntity for Item {
///     type Id = u32; type Key = String; type Create = ItemCreate; type Update = ItemUpdate;
///     type Context = (); type Error = ItemError;
///     fn key(&self) -> &String { &self.code }
///     fn from_create_params(id: u32, _: ItemCreate) -> Result<Self, ItemError> {
///         Ok(Self { id, code: format!("item-{id}") })
///     }
///     async fn on_update(&mut self, _: ItemUpdate, _: &()) -> Result<(), ItemError> { Ok(()) }
/// }
///
/// struct ItemClient { inner: ResourceClient<Item> }
///
/// #[async_trait]
/// impl ActorClient<Item> for ItemClient {
///     type Error = ItemError;
///     fn inner(&self) -> &ResourceClient<Item> { &self.inner }
///     fn map_error(e: FrameworkError) -> ItemError { ItemError(e.to_string()) }
/// }
///
/// async fn usage(client: ItemClient) {
///     // get(), list() and delete() are provided automatically!
///     let _ = client.get(Target::Key("item-1".into())).await;
///     let _ = client.list().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The record-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific record error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a record by id or key.
    #[tracing::instrument(skip(self))]
    async fn get(&self, target: Target<T>) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(target).await.map_err(Self::map_error)
    }

    /// Fetch every record.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }

    /// Delete a record by id or key, returning what was removed.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, target: Target<T>) -> Result<T, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(target).await.map_err(Self::map_error)
    }
}
