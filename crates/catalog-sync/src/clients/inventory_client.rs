//! # Inventory Client
//!
//! Store-level access to inventory records, addressed by SKU. Every method is a single request to
//! the Inventory actor, so each one is atomic on its own; no method spans two requests.
use crate::inventory_actor::InventoryError;
use crate::model::{InventoryCreate, InventoryRecord, InventoryUpdate};
use async_trait::async_trait;
use sync_framework::{ActorClient, FrameworkError, ResourceClient, Target};
use tracing::{debug, instrument};

/// Client for interacting with the Inventory actor.
#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryRecord>,
}

impl InventoryClient {
    pub fn new(inner: ResourceClient<InventoryRecord>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<InventoryRecord> for InventoryClient {
    type Error = InventoryError;

    fn inner(&self) -> &ResourceClient<InventoryRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(target) => InventoryError::NotFound(target),
            FrameworkError::Conflict(sku) => InventoryError::Conflict(sku),
            other => other
                .downcast_entity::<InventoryError>()
                .unwrap_or_else(|other| InventoryError::ActorCommunicationError(other.to_string())),
        }
    }
}

impl InventoryClient {
    /// Inserts a record unless one already holds `sku` (`Conflict`).
    #[instrument(skip(self))]
    pub async fn insert(&self, sku: &str, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.inner
            .create(InventoryCreate {
                sku: sku.to_string(),
                quantity,
            })
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<InventoryRecord>, InventoryError> {
        self.get(Target::Key(sku.to_string())).await
    }

    /// Moves the record holding `old_sku` to `new_sku`.
    #[instrument(skip(self))]
    pub async fn rename(&self, old_sku: &str, new_sku: &str) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.inner
            .update(
                Target::Key(old_sku.to_string()),
                InventoryUpdate::Rename {
                    new_sku: new_sku.to_string(),
                },
            )
            .await
            .map_err(Self::map_error)
    }

    /// Sets the quantity of the record holding `sku`, if there still is one.
    #[instrument(skip(self))]
    pub async fn store_quantity(&self, sku: &str, quantity: u32) -> Result<InventoryRecord, InventoryError> {
        debug!("Sending request");
        self.inner
            .update(
                Target::Key(sku.to_string()),
                InventoryUpdate::SetQuantity(quantity),
            )
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_sku(&self, sku: &str) -> Result<InventoryRecord, InventoryError> {
        self.delete(Target::Key(sku.to_string())).await
    }
}
