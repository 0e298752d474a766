use catalog_sync::config::SyncConfig;
use catalog_sync::inventory_actor::InventoryError;
use catalog_sync::lifecycle::{CatalogSystem, SystemError};
use catalog_sync::model::{ProductRequest, ProductUpdate};
use catalog_sync::product_actor::ProductError;
use rust_decimal::Decimal;
use std::time::Duration;
use sync_framework::channel::RetryPolicy;
use sync_framework::circuit_breaker::CircuitState;
use sync_framework::ActorClient;

fn request(sku: &str) -> ProductRequest {
    ProductRequest {
        sku: sku.to_string(),
        name: "Widget".to_string(),
        description: "A widget".to_string(),
        price: Decimal::new(1250, 2),
        image_url: None,
    }
}

fn test_config(duplicate_deliveries: bool) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.delivery.retry = RetryPolicy {
        max_attempts: 5,
        initial_backoff: Duration::from_millis(2),
        multiplier: 2.0,
        max_backoff: Duration::from_millis(20),
    };
    config.delivery.duplicate_deliveries = duplicate_deliveries;
    config
}

async fn inventory_skus(system: &CatalogSystem) -> Vec<String> {
    let mut skus: Vec<String> = system
        .inventory_client
        .list()
        .await
        .expect("list failed")
        .into_iter()
        .map(|record| record.sku)
        .collect();
    skus.sort();
    skus
}

/// Full product lifecycle, every event delivered twice.
#[tokio::test]
async fn test_catalog_and_inventory_converge() {
    let system = CatalogSystem::start(test_config(true)).await.unwrap();

    let widget = system.product_client.create_product(request("A1")).await.unwrap();
    let gadget = system.product_client.create_product(request("C3")).await.unwrap();
    system.wait_replicated().await;
    assert_eq!(inventory_skus(&system).await, vec!["A1", "C3"]);

    let record = system.stock_client.set_quantity("A1", 40).await.unwrap();
    assert_eq!(record.quantity, 40);

    system.product_client.rename_product(widget.id.clone(), "B2").await.unwrap();
    system.wait_replicated().await;
    assert_eq!(inventory_skus(&system).await, vec!["B2", "C3"]);
    // Renaming keeps the record and its stock
    assert_eq!(system.stock_client.get_inventory("B2").await.unwrap().quantity, 40);

    system.product_client.delete_product(gadget.id).await.unwrap();
    system.wait_replicated().await;
    assert_eq!(inventory_skus(&system).await, vec!["B2"]);

    assert!(system.dead_letters.is_empty());
    assert_eq!(system.channel.events_published(), 4);
    system.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_update_without_sku_change_publishes_nothing() {
    let system = CatalogSystem::start(test_config(false)).await.unwrap();

    let product = system.product_client.create_product(request("A1")).await.unwrap();
    system.wait_replicated().await;

    let update = ProductUpdate {
        name: Some("Better widget".to_string()),
        price: Some(Decimal::new(1500, 2)),
        ..ProductUpdate::default()
    };
    let updated = system
        .product_client
        .update_product(product.id, update)
        .await
        .unwrap();
    assert_eq!(updated.name, "Better widget");
    system.wait_replicated().await;

    assert_eq!(system.channel.events_published(), 1);
    assert_eq!(inventory_skus(&system).await, vec!["A1"]);
    system.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_rejected_product_writes_publish_nothing() {
    let system = CatalogSystem::start(test_config(false)).await.unwrap();

    system.product_client.create_product(request("A1")).await.unwrap();
    let duplicate = system.product_client.create_product(request("A1")).await;
    assert!(matches!(duplicate, Err(ProductError::Conflict(_))));

    let invalid = system.product_client.create_product(request("  ")).await;
    assert!(matches!(invalid, Err(ProductError::Validation(_))));

    system.wait_replicated().await;
    assert_eq!(system.channel.events_published(), 1);
    system.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_stock_write_for_deleted_product_is_refused() {
    let system = CatalogSystem::start(test_config(false)).await.unwrap();

    let product = system.product_client.create_product(request("A1")).await.unwrap();
    system.wait_replicated().await;
    system.stock_client.set_quantity("A1", 3).await.unwrap();

    // Product gone, inventory record still present until the event is consumed
    system.channel.close();
    system.product_client.delete_product(product.id).await.unwrap();

    let result = system.stock_client.set_quantity("A1", 8).await;
    assert!(matches!(result, Err(InventoryError::NotFound(_))));
    assert_eq!(system.stock_client.get_inventory("A1").await.unwrap().quantity, 3);
    assert_eq!(system.breaker.state(), CircuitState::Closed);

    system.shutdown(Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn test_invalid_configuration_is_refused() {
    let mut config = SyncConfig::default();
    config.product_lookup.sliding_window_size = 0;

    let result = CatalogSystem::start(config).await;
    assert!(matches!(result, Err(SystemError::Config(_))));
}
