//! Entity trait implementation for [`InventoryRecord`].
//!
//! The SKU is the record's key, so the actor's unique index is what makes "insert unless this
//! SKU exists" and "rename the record holding this SKU" single atomic steps.

use super::InventoryError;
use crate::model::{InventoryCreate, InventoryId, InventoryRecord, InventoryUpdate};
use async_trait::async_trait;
use chrono::Utc;
use sync_framework::ActorEntity;

fn require_sku(sku: &str) -> Result<(), InventoryError> {
    if sku.trim().is_empty() {
        return Err(InventoryError::Validation("sku is mandatory".to_string()));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for InventoryRecord {
    type Id = InventoryId;
    type Key = String;
    type Create = InventoryCreate;
    type Update = InventoryUpdate;
    type Context = ();
    type Error = InventoryError;

    fn key(&self) -> &String {
        &self.sku
    }

    fn from_create_params(id: InventoryId, params: InventoryCreate) -> Result<Self, Self::Error> {
        require_sku(&params.sku)?;
        let now = Utc::now();
        Ok(Self {
            id,
            sku: params.sku,
            quantity: params.quantity,
            created_at: now,
            updated_at: now,
        })
    }

    async fn on_update(&mut self, update: InventoryUpdate, _ctx: &()) -> Result<(), Self::Error> {
        match update {
            InventoryUpdate::Rename { new_sku } => {
                require_sku(&new_sku)?;
                self.sku = new_sku;
            }
            InventoryUpdate::SetQuantity(quantity) => self.quantity = quantity,
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
