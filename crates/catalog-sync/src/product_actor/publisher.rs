//! Outbound side of product replication: serializes lifecycle events onto the channel.

use super::ProductError;
use crate::model::ProductEvent;
use std::sync::Arc;
use sync_framework::channel::EventChannel;
use tracing::info;

/// Context of the product actor. Handed to every post-commit hook.
#[derive(Clone)]
pub struct ProductEventPublisher {
    channel: Arc<dyn EventChannel>,
}

impl ProductEventPublisher {
    pub fn new(channel: Arc<dyn EventChannel>) -> Self {
        Self { channel }
    }

    pub async fn publish(&self, event: ProductEvent) -> Result<(), ProductError> {
        let payload = event
            .to_payload()
            .map_err(|e| ProductError::Publish(e.to_string()))?;
        self.channel
            .publish(event.topic(), payload)
            .await
            .map_err(|e| ProductError::Publish(e.to_string()))?;
        info!(topic = event.topic(), sku = event.sku(), "Event published");
        Ok(())
    }
}
