//! # Product Client
//!
//! Provides a high-level API for interacting with the Product actor.
//! It wraps a `ResourceClient<ProductRecord>` and exposes catalog operations.
use crate::model::{ProductId, ProductRecord, ProductRequest, ProductUpdate};
use crate::product_actor::ProductError;
use async_trait::async_trait;
use sync_framework::{ActorClient, FrameworkError, ResourceClient, Target};
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<ProductRecord>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<ProductRecord>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<ProductRecord> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<ProductRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(target) => ProductError::NotFound(target),
            FrameworkError::Conflict(sku) => ProductError::Conflict(sku),
            other => other
                .downcast_entity::<ProductError>()
                .unwrap_or_else(|other| ProductError::ActorCommunicationError(other.to_string())),
        }
    }
}

impl ProductClient {
    /// Creates a product and announces it on `product.created`.
    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_product(&self, request: ProductRequest) -> Result<ProductRecord, ProductError> {
        debug!(?request, "Sending request");
        self.inner.create(request).await.map_err(Self::map_error)
    }

    /// Applies a partial update. A SKU change is announced on `product.updated`.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductError> {
        debug!("Sending request");
        self.inner
            .update(Target::Id(id), update)
            .await
            .map_err(Self::map_error)
    }

    /// Changes only the SKU of a product.
    #[instrument(skip(self, new_sku))]
    pub async fn rename_product(
        &self,
        id: ProductId,
        new_sku: impl Into<String> + Send,
    ) -> Result<ProductRecord, ProductError> {
        self.update_product(id, ProductUpdate::rename(new_sku)).await
    }

    /// Deletes a product, returning the removed record.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<ProductRecord, ProductError> {
        debug!("Sending request");
        self.inner
            .delete(Target::Id(id))
            .await
            .map_err(Self::map_error)
    }

    /// The single-SKU lookup other services confirm products with.
    #[instrument(skip(self))]
    pub async fn get_product_by_sku(&self, sku: &str) -> Result<ProductRecord, ProductError> {
        debug!("Sending request");
        self.inner
            .get(Target::Key(sku.to_string()))
            .await
            .map_err(Self::map_error)?
            .ok_or_else(|| ProductError::NotFound(format!("sku {sku}")))
    }
}
