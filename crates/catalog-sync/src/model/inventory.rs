//! Derived stock records, one per SKU.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for inventory records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(pub u32);

impl From<u32> for InventoryId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for InventoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inventory_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub sku: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryCreate {
    pub sku: String,
    pub quantity: u32,
}

/// Conditional updates applied to the record currently holding a SKU.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryUpdate {
    Rename { new_sku: String },
    SetQuantity(u32),
}
