//! # Catalog Sync demo
//!
//! Runs the whole system in one process:
//! 1. Starts [`CatalogSystem`] from the configuration named by `CATALOG_SYNC_CONFIG`.
//! 2. Creates a product and waits for its inventory record to be replicated.
//! 3. Sets the stock through the guarded write path.
//! 4. Renames, then deletes the product, following the record in the inventory.

use catalog_sync::config::SyncConfig;
use catalog_sync::lifecycle::CatalogSystem;
use catalog_sync::model::ProductRequest;
use rust_decimal::Decimal;
use std::time::Duration;
use sync_framework::tracing::setup_tracing;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = SyncConfig::from_env().map_err(|e| e.to_string())?;
    let system = CatalogSystem::start(config)
        .await
        .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("product_creation");
    let product = async {
        system
            .product_client
            .create_product(ProductRequest {
                sku: "WIDGET-1".to_string(),
                name: "Widget".to_string(),
                description: "A very ordinary widget".to_string(),
                price: Decimal::new(2999, 2),
                image_url: Some("https://example.com/widget.png".to_string()),
            })
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    info!(id = %product.id, sku = %product.sku, "Product created");

    system.wait_replicated().await;

    let span = tracing::info_span!("stock_update");
    async {
        match system.stock_client.set_quantity(&product.sku, 25).await {
            Ok(record) => info!(sku = %record.sku, quantity = record.quantity, "Stock set"),
            Err(e) => error!(error = %e, "Stock update failed"),
        }
        match system.stock_client.set_quantity("UNKNOWN-9", 5).await {
            Ok(_) => error!("Stock set for an unknown product"),
            Err(e) => info!(error = %e, "Stock update refused as expected"),
        }
    }
    .instrument(span)
    .await;

    let renamed = system
        .product_client
        .rename_product(product.id, "WIDGET-2")
        .await
        .map_err(|e| e.to_string())?;
    system.wait_replicated().await;

    match system.stock_client.get_inventory(&renamed.sku).await {
        Ok(record) => info!(sku = %record.sku, quantity = record.quantity, "Inventory followed the rename"),
        Err(e) => error!(error = %e, "Inventory did not follow the rename"),
    }

    system
        .product_client
        .delete_product(renamed.id)
        .await
        .map_err(|e| e.to_string())?;
    system.wait_replicated().await;

    let remaining = system
        .stock_client
        .list_inventory()
        .await
        .map_err(|e| e.to_string())?;
    let metrics = system.breaker.metrics();
    info!(
        records = remaining.len(),
        breaker_state = %metrics.state,
        breaker_calls = metrics.buffered_calls,
        dead_letters = system.dead_letters.len(),
        "Demo finished"
    );

    system.shutdown(Duration::from_secs(5)).await?;

    info!("Application completed successfully");
    Ok(())
}
