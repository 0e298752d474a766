//! Product catalog records and the payloads that create or change them.
//!
//! # Actor Framework
//! [`ProductRecord`] implements [`ActorEntity`](sync_framework::ActorEntity) (see
//! [`crate::product_actor`]) with the SKU as its unique key, so the product actor refuses two
//! products with the same SKU.
use crate::product_actor::ProductError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// The authoritative catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), ProductError> {
        require_text("sku", &self.sku)?;
        require_text("name", &self.name)?;
        require_text("description", &self.description)?;
        require_price(self.price)?;
        if let Some(url) = &self.image_url {
            require_url(url)?;
        }
        Ok(())
    }
}

/// Partial update of a product. Fields left as `None` keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
}

impl ProductUpdate {
    /// An update that only changes the SKU.
    pub fn rename(sku: impl Into<String>) -> Self {
        Self {
            sku: Some(sku.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if let Some(sku) = &self.sku {
            require_text("sku", sku)?;
        }
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(price) = self.price {
            require_price(price)?;
        }
        if let Some(Some(url)) = &self.image_url {
            require_url(url)?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ProductError> {
    if value.trim().is_empty() {
        return Err(ProductError::Validation(format!("{field} is mandatory")));
    }
    Ok(())
}

fn require_price(price: Decimal) -> Result<(), ProductError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ProductError::Validation(format!(
            "price must be zero or positive, got {price}"
        )));
    }
    Ok(())
}

fn require_url(url: &str) -> Result<(), ProductError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') && !url.contains(char::is_whitespace) => Ok(()),
        _ => Err(ProductError::Validation(format!(
            "imageUrl must be a valid http(s) URL, got {url:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProductRequest {
        ProductRequest {
            sku: "123ABC".to_string(),
            name: "Test Product".to_string(),
            description: "Description".to_string(),
            price: Decimal::new(10000, 2),
            image_url: Some("http://example.com/image.png".to_string()),
        }
    }

    #[test]
    fn test_valid_request() {
        assert_eq!(request().validate(), Ok(()));

        let free = ProductRequest {
            price: Decimal::ZERO,
            image_url: None,
            ..request()
        };
        assert_eq!(free.validate(), Ok(()));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let blank_sku = ProductRequest {
            sku: "  ".to_string(),
            ..request()
        };
        assert_eq!(
            blank_sku.validate(),
            Err(ProductError::Validation("sku is mandatory".to_string()))
        );

        let blank_name = ProductRequest {
            name: String::new(),
            ..request()
        };
        assert!(matches!(blank_name.validate(), Err(ProductError::Validation(_))));
    }

    #[test]
    fn test_negative_price_and_bad_url_are_rejected() {
        let negative = ProductRequest {
            price: Decimal::new(-1, 2),
            ..request()
        };
        assert!(matches!(negative.validate(), Err(ProductError::Validation(_))));

        for url in ["ftp://example.com/x.png", "example.com", "http://", "https:// spaced"] {
            let bad = ProductRequest {
                image_url: Some(url.to_string()),
                ..request()
            };
            assert!(
                matches!(bad.validate(), Err(ProductError::Validation(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        assert_eq!(ProductUpdate::default().validate(), Ok(()));
        assert_eq!(ProductUpdate::rename("NEW-1").validate(), Ok(()));
        assert!(ProductUpdate::rename("").validate().is_err());

        let clear_image = ProductUpdate {
            image_url: Some(None),
            ..ProductUpdate::default()
        };
        assert_eq!(clear_image.validate(), Ok(()));
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let now = Utc::now();
        let record = ProductRecord {
            id: ProductId(1),
            sku: "A1".to_string(),
            name: "n".to_string(),
            description: "d".to_string(),
            price: Decimal::new(1999, 2),
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 1);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("imageUrl").is_none());
    }
}
