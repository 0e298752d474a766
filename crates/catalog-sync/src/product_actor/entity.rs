//! Entity trait implementation for [`ProductRecord`].
//!
//! Writes are validated before they reach the store; lifecycle events are published from the
//! post-commit hooks, so an event is only ever emitted for a write that actually happened.

use super::{ProductError, ProductEventPublisher};
use crate::model::{
    ProductCreated, ProductDeleted, ProductEvent, ProductId, ProductRecord, ProductRenamed,
    ProductRequest, ProductUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use sync_framework::ActorEntity;

#[async_trait]
impl ActorEntity for ProductRecord {
    type Id = ProductId;
    type Key = String;
    type Create = ProductRequest;
    type Update = ProductUpdate;
    type Context = ProductEventPublisher;
    type Error = ProductError;

    fn key(&self) -> &String {
        &self.sku
    }

    fn from_create_params(id: ProductId, params: ProductRequest) -> Result<Self, Self::Error> {
        params.validate()?;
        let now = Utc::now();
        Ok(Self {
            id,
            sku: params.sku,
            name: params.name,
            description: params.description,
            price: params.price,
            image_url: params.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies every field present in the update. The SKU may change; the actor checks the new
    /// one is free before committing.
    async fn on_update(
        &mut self,
        update: ProductUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        update.validate()?;
        if let Some(sku) = update.sku {
            self.sku = sku;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    async fn after_create(&self, publisher: &ProductEventPublisher) -> Result<(), Self::Error> {
        publisher
            .publish(ProductEvent::Created(ProductCreated {
                sku: self.sku.clone(),
            }))
            .await
    }

    /// Only a SKU change is interesting downstream.
    async fn after_update(
        &self,
        previous: &Self,
        publisher: &ProductEventPublisher,
    ) -> Result<(), Self::Error> {
        if previous.sku == self.sku {
            return Ok(());
        }
        publisher
            .publish(ProductEvent::Renamed(ProductRenamed {
                old_sku: previous.sku.clone(),
                new_sku: self.sku.clone(),
            }))
            .await
    }

    async fn after_delete(&self, publisher: &ProductEventPublisher) -> Result<(), Self::Error> {
        publisher
            .publish(ProductEvent::Deleted(ProductDeleted {
                sku: self.sku.clone(),
            }))
            .await
    }
}
