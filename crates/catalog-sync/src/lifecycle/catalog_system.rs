use crate::clients::{InventoryClient, ProductClient, StockClient};
use crate::config::{ConfigError, SyncConfig};
use crate::lookup::{CatalogLookup, GuardedLookup};
use crate::product_actor::ProductEventPublisher;
use crate::replication::{subscribe_replica, InventoryReplica};
use crate::{inventory_actor, product_actor};
use std::sync::Arc;
use std::time::Duration;
use sync_framework::channel::{ChannelError, DeadLetterQueue, InMemoryEventChannel};
use sync_framework::circuit_breaker::CircuitBreaker;
use sync_framework::clock::{Clock, SystemClock};
use thiserror::Error;
use tracing::{info, warn};

/// Name of the breaker guarding the product lookup.
pub const PRODUCT_LOOKUP_BREAKER: &str = "productServiceCircuitBreaker";

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot subscribe replica: {0}")]
    Subscribe(#[from] ChannelError),
}

/// Both services wired together in one process.
///
/// # Example
///
/// ```rust,ignore
/// let system = CatalogSystem::start(SyncConfig::from_env()?).await?;
/// // ... use system.product_client, system.stock_client ...
/// system.shutdown(Duration::from_secs(5)).await?;
/// ```
pub struct CatalogSystem {
    /// Product Authority writes and lookups
    pub product_client: ProductClient,

    /// Store-level inventory access
    pub inventory_client: InventoryClient,

    /// Operator inventory API with guarded writes
    pub stock_client: StockClient,

    /// The channel carrying product events
    pub channel: InMemoryEventChannel,

    /// Where undeliverable events end up
    pub dead_letters: Arc<DeadLetterQueue>,

    /// Breaker guarding the product lookup; `reload` it to apply new options
    pub breaker: Arc<CircuitBreaker>,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CatalogSystem {
    /// Validates `config`, starts both actors and subscribes the inventory replica.
    pub async fn start(config: SyncConfig) -> Result<Self, SystemError> {
        Self::start_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Like [`CatalogSystem::start`], with the breaker reading time from `clock`.
    pub async fn start_with_clock(
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SystemError> {
        config.validate()?;

        let dead_letters = Arc::new(DeadLetterQueue::new());
        let channel = InMemoryEventChannel::new(config.delivery.clone(), dead_letters.clone());

        // 1. Create actors (no dependencies yet)
        let (product_actor, product_client) = product_actor::new(config.actor_buffer_size);
        let (inventory_actor, inventory_client) = inventory_actor::new(config.actor_buffer_size);

        // 2. Start actors; the product actor gets the publisher as its context
        let publisher = ProductEventPublisher::new(Arc::new(channel.clone()));
        let product_handle = tokio::spawn(product_actor.run(publisher));
        let inventory_handle = tokio::spawn(inventory_actor.run(()));

        let product_client = ProductClient::new(product_client);
        let inventory_client = InventoryClient::new(inventory_client);

        // 3. Wire the consumer side
        subscribe_replica(&channel, InventoryReplica::new(inventory_client.clone())).await?;

        let breaker = Arc::new(CircuitBreaker::new(
            PRODUCT_LOOKUP_BREAKER,
            config.product_lookup.clone(),
            clock,
        ));
        let lookup = GuardedLookup::new(
            Arc::new(CatalogLookup::new(product_client.clone())),
            breaker.clone(),
        );
        let stock_client = StockClient::new(inventory_client.clone(), Arc::new(lookup));

        info!(buffer_size = config.actor_buffer_size, "Catalog system started");

        Ok(Self {
            product_client,
            inventory_client,
            stock_client,
            channel,
            dead_letters,
            breaker,
            handles: vec![product_handle, inventory_handle],
        })
    }

    /// Waits until every event published so far has been handled or dead-lettered.
    pub async fn wait_replicated(&self) {
        self.channel.wait_idle().await;
    }

    /// Graceful shutdown.
    ///
    /// 1. Close the channel and give in-flight deliveries up to `grace` to settle
    /// 2. Drop every client so the actors' receivers close
    /// 3. Await the actor tasks
    pub async fn shutdown(self, grace: Duration) -> Result<(), String> {
        info!("Shutting down system...");

        self.channel.shutdown(grace).await;
        let dead_letters = self.dead_letters.len();
        if dead_letters > 0 {
            warn!(dead_letters, "Shutting down with dead-lettered events");
        }

        // The replica handlers hold inventory clients; dropping the channel releases them.
        drop(self.channel);
        drop(self.stock_client);
        drop(self.inventory_client);
        drop(self.product_client);

        for handle in self.handles {
            handle
                .await
                .map_err(|e| format!("Actor task failed: {e}"))?;
        }

        info!("System shutdown complete");
        Ok(())
    }
}
