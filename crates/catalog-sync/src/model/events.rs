//! Product lifecycle events and the topics they travel on.
//!
//! Payloads are JSON with camelCase keys:
//!
//! | Topic | Payload |
//! |-------|---------|
//! | `product.created` | `{"sku": "..."}` |
//! | `product.updated` | `{"oldSku": "...", "newSku": "..."}` |
//! | `product.deleted` | `{"sku": "..."}` |
use serde::{Deserialize, Serialize};

pub const PRODUCT_CREATED: &str = "product.created";
pub const PRODUCT_UPDATED: &str = "product.updated";
pub const PRODUCT_DELETED: &str = "product.deleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRenamed {
    pub old_sku: String,
    pub new_sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeleted {
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductEvent {
    Created(ProductCreated),
    Renamed(ProductRenamed),
    Deleted(ProductDeleted),
}

impl ProductEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => PRODUCT_CREATED,
            ProductEvent::Renamed(_) => PRODUCT_UPDATED,
            ProductEvent::Deleted(_) => PRODUCT_DELETED,
        }
    }

    /// The SKU the event is about; the new one for a rename.
    pub fn sku(&self) -> &str {
        match self {
            ProductEvent::Created(e) => &e.sku,
            ProductEvent::Renamed(e) => &e.new_sku,
            ProductEvent::Deleted(e) => &e.sku,
        }
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            ProductEvent::Created(e) => serde_json::to_vec(e),
            ProductEvent::Renamed(e) => serde_json::to_vec(e),
            ProductEvent::Deleted(e) => serde_json::to_vec(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_payload_shape() {
        let event = ProductEvent::Renamed(ProductRenamed {
            old_sku: "A1".to_string(),
            new_sku: "B2".to_string(),
        });
        assert_eq!(event.topic(), "product.updated");
        assert_eq!(
            String::from_utf8(event.to_payload().unwrap()).unwrap(),
            r#"{"oldSku":"A1","newSku":"B2"}"#
        );
    }
}
