//! # Stock Client
//!
//! The operator-facing inventory API. Quantity writes and manual creates must be confirmed by the
//! Product Authority first, through the [`GuardedLookup`]; reads and deletes go straight to the
//! store.
//!
//! ## Quantity write path
//!
//! ```text
//! set_quantity(sku, q)
//!   1. q outside 0..=u32::MAX            -> Validation          (no lookup)
//!   2. no inventory record for sku       -> NotFound            (no lookup)
//!   3. guarded fetchProductBySku(sku)
//!        NotFound                        -> NotFound            (nothing written)
//!        fallback denial                 -> ServiceUnavailable  (nothing written)
//!   4. conditional update by sku         -> record, or NotFound if it was deleted meanwhile
//! ```
//!
//! The lookup runs outside the inventory actor, so a slow product service delays only this
//! caller.
use super::InventoryClient;
use crate::inventory_actor::InventoryError;
use crate::lookup::{GuardedLookup, LookupError, ProductLookup};
use crate::model::InventoryRecord;
use std::sync::Arc;
use sync_framework::ActorClient;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct StockClient {
    inventory: InventoryClient,
    lookup: Arc<GuardedLookup>,
}

impl StockClient {
    pub fn new(inventory: InventoryClient, lookup: Arc<GuardedLookup>) -> Self {
        Self { inventory, lookup }
    }

    pub fn lookup(&self) -> &Arc<GuardedLookup> {
        &self.lookup
    }

    /// Sets the stock of an existing record after the product is confirmed.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, sku: &str, quantity: i64) -> Result<InventoryRecord, InventoryError> {
        let quantity = checked_quantity(quantity)?;

        if self.inventory.find_by_sku(sku).await?.is_none() {
            return Err(InventoryError::NotFound(format!(
                "inventory not found with sku {sku}"
            )));
        }

        self.confirm_product(sku).await?;

        let record = self.inventory.store_quantity(sku, quantity).await?;
        info!(sku, quantity, "Quantity updated");
        Ok(record)
    }

    /// Creates a record for a confirmed product.
    #[instrument(skip(self))]
    pub async fn create_inventory(&self, sku: &str, quantity: i64) -> Result<InventoryRecord, InventoryError> {
        let quantity = checked_quantity(quantity)?;
        if sku.trim().is_empty() {
            return Err(InventoryError::Validation("sku is mandatory".to_string()));
        }

        self.confirm_product(sku).await?;

        let record = self.inventory.insert(sku, quantity).await?;
        info!(sku, quantity, "Inventory created");
        Ok(record)
    }

    pub async fn list_inventory(&self) -> Result<Vec<InventoryRecord>, InventoryError> {
        self.inventory.list().await
    }

    pub async fn get_inventory(&self, sku: &str) -> Result<InventoryRecord, InventoryError> {
        self.inventory
            .find_by_sku(sku)
            .await?
            .ok_or_else(|| InventoryError::NotFound(format!("inventory not found with sku {sku}")))
    }

    /// Removes a record, returning it.
    pub async fn delete_inventory(&self, sku: &str) -> Result<InventoryRecord, InventoryError> {
        self.inventory.delete_by_sku(sku).await
    }

    async fn confirm_product(&self, sku: &str) -> Result<(), InventoryError> {
        match self.lookup.fetch_product_by_sku(sku).await {
            Ok(_) => Ok(()),
            Err(LookupError::NotFound(_)) => Err(InventoryError::NotFound(format!(
                "product not found with sku {sku}"
            ))),
            Err(LookupError::Unavailable(reason)) | Err(LookupError::Transient(reason)) => {
                warn!(sku, %reason, "Product could not be confirmed");
                Err(InventoryError::ServiceUnavailable(reason))
            }
        }
    }
}

fn checked_quantity(quantity: i64) -> Result<u32, InventoryError> {
    u32::try_from(quantity).map_err(|_| {
        InventoryError::Validation(format!(
            "quantity must be between 0 and {}, got {quantity}",
            u32::MAX
        ))
    })
}
