//! Idempotent application of product lifecycle events to inventory records.
//!
//! Each operation is safe to run any number of times and in any order relative to the others.
//! Replays and duplicates are reported as [`Applied::AlreadyApplied`] rather than as errors.
//!
//! The rename path distinguishes "already applied" from "arrived too early": when no record holds
//! the old SKU, a record holding the new SKU means the rename happened before; no record at all
//! means the create has not been applied yet, which is a transient [`InventoryError::NotFound`].
//! A record is never invented from a rename.
//!
//! Known gap: events carry no version, so a `ProductDeleted(B)` handled before the
//! `ProductRenamed(A -> B)` it follows leaves a stale record for B.

use crate::clients::InventoryClient;
use crate::inventory_actor::InventoryError;
use crate::model::InventoryRecord;
use tracing::debug;

/// What applying one event did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Inserted(InventoryRecord),
    Renamed(InventoryRecord),
    Removed(InventoryRecord),
    AlreadyApplied,
}

impl Applied {
    pub fn label(&self) -> &'static str {
        match self {
            Applied::Inserted(_) => "Inserted",
            Applied::Renamed(_) => "Renamed",
            Applied::Removed(_) => "Removed",
            Applied::AlreadyApplied => "AlreadyApplied",
        }
    }
}

#[derive(Clone)]
pub struct InventoryReplica {
    inventory: InventoryClient,
}

impl InventoryReplica {
    pub fn new(inventory: InventoryClient) -> Self {
        Self { inventory }
    }

    /// `ProductCreated{sku}`: a record with quantity 0, unless the SKU already has one.
    pub async fn on_created(&self, sku: &str) -> Result<Applied, InventoryError> {
        match self.inventory.insert(sku, 0).await {
            Ok(record) => Ok(Applied::Inserted(record)),
            Err(InventoryError::Conflict(_)) => {
                debug!(sku, "Record already present");
                Ok(Applied::AlreadyApplied)
            }
            Err(e) => Err(e),
        }
    }

    /// `ProductRenamed{oldSku, newSku}`: move the record holding `old_sku` to `new_sku`.
    pub async fn on_renamed(&self, old_sku: &str, new_sku: &str) -> Result<Applied, InventoryError> {
        match self.inventory.rename(old_sku, new_sku).await {
            Ok(record) if old_sku == new_sku => {
                debug!(sku = new_sku, id = %record.id, "Rename to the same sku");
                Ok(Applied::AlreadyApplied)
            }
            Ok(record) => Ok(Applied::Renamed(record)),
            Err(InventoryError::NotFound(_)) => {
                if self.inventory.find_by_sku(new_sku).await?.is_some() {
                    debug!(old_sku, new_sku, "Rename already applied");
                    Ok(Applied::AlreadyApplied)
                } else {
                    Err(InventoryError::NotFound(format!(
                        "no inventory record for sku {old_sku} or {new_sku}; create not applied yet"
                    )))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// `ProductDeleted{sku}`: remove the record holding `sku`, if any.
    pub async fn on_deleted(&self, sku: &str) -> Result<Applied, InventoryError> {
        match self.inventory.delete_by_sku(sku).await {
            Ok(record) => Ok(Applied::Removed(record)),
            Err(InventoryError::NotFound(_)) => {
                debug!(sku, "Nothing to delete");
                Ok(Applied::AlreadyApplied)
            }
            Err(e) => Err(e),
        }
    }
}
