//! Channel-facing side of replication: decode, apply, classify.

use super::{Applied, InventoryReplica};
use crate::inventory_actor::InventoryError;
use crate::model::{
    ProductCreated, ProductDeleted, ProductRenamed, PRODUCT_CREATED, PRODUCT_DELETED,
    PRODUCT_UPDATED,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use sync_framework::channel::{ChannelError, Delivery, EventChannel, EventHandler, HandlerError};
use tracing::{info, instrument};

/// Consumes all three product topics on behalf of an [`InventoryReplica`].
pub struct ReplicationHandler {
    replica: InventoryReplica,
}

impl ReplicationHandler {
    pub fn new(replica: InventoryReplica) -> Self {
        Self { replica }
    }

    async fn apply(&self, delivery: &Delivery) -> Result<Applied, HandlerError> {
        let outcome = match delivery.topic.as_str() {
            PRODUCT_CREATED => {
                let event: ProductCreated = decode(delivery)?;
                require_sku(&event.sku)?;
                self.replica.on_created(&event.sku).await
            }
            PRODUCT_UPDATED => {
                let event: ProductRenamed = decode(delivery)?;
                require_sku(&event.old_sku)?;
                require_sku(&event.new_sku)?;
                self.replica.on_renamed(&event.old_sku, &event.new_sku).await
            }
            PRODUCT_DELETED => {
                let event: ProductDeleted = decode(delivery)?;
                require_sku(&event.sku)?;
                self.replica.on_deleted(&event.sku).await
            }
            other => {
                return Err(HandlerError::Rejected(format!("unexpected topic {other}")));
            }
        };
        outcome.map_err(classify)
    }
}

#[async_trait]
impl EventHandler for ReplicationHandler {
    #[instrument(skip(self, delivery), fields(topic = %delivery.topic, attempt = delivery.attempt))]
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
        let applied = self.apply(delivery).await?;
        info!(applied = applied.label(), "Replicated");
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(delivery: &Delivery) -> Result<T, HandlerError> {
    serde_json::from_slice(&delivery.payload)
        .map_err(|e| HandlerError::Rejected(format!("malformed payload: {e}")))
}

fn require_sku(sku: &str) -> Result<(), HandlerError> {
    if sku.trim().is_empty() {
        return Err(HandlerError::Rejected("event without sku".to_string()));
    }
    Ok(())
}

/// Validation can never succeed on retry; everything else might. A rename conflict is expected
/// to clear once the pending delete for the blocking record is applied.
fn classify(error: InventoryError) -> HandlerError {
    match error {
        InventoryError::Validation(reason) => HandlerError::Rejected(reason),
        other => HandlerError::Transient(other.to_string()),
    }
}

/// Subscribes one replica to every product topic.
pub async fn subscribe_replica(
    channel: &dyn EventChannel,
    replica: InventoryReplica,
) -> Result<(), ChannelError> {
    let handler: Arc<dyn EventHandler> = Arc::new(ReplicationHandler::new(replica));
    for topic in [PRODUCT_CREATED, PRODUCT_UPDATED, PRODUCT_DELETED] {
        channel.subscribe(topic, handler.clone()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            classify(InventoryError::Validation("sku is mandatory".into())),
            HandlerError::Rejected("sku is mandatory".into())
        );
        assert!(matches!(
            classify(InventoryError::NotFound("A1".into())),
            HandlerError::Transient(_)
        ));
        assert!(matches!(
            classify(InventoryError::Conflict("B2".into())),
            HandlerError::Transient(_)
        ));
    }
}
