use async_trait::async_trait;
use catalog_sync::clients::{InventoryClient, StockClient};
use catalog_sync::inventory_actor::{self, InventoryError};
use catalog_sync::lookup::{GuardedLookup, LookupError, ProductLookup};
use catalog_sync::model::{ProductId, ProductRecord};
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use sync_framework::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use sync_framework::clock::ManualClock;

/// Product service stand-in whose behaviour can be switched between calls.
#[derive(Default)]
struct ProductService {
    mode: Mutex<Mode>,
    calls: Mutex<usize>,
}

#[derive(Clone, Copy, Default)]
enum Mode {
    #[default]
    Found,
    Missing,
    Failing,
    Hanging,
}

impl ProductService {
    fn set(&self, mode: Mode) {
        *self.mode.lock() = mode;
    }

    fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ProductLookup for ProductService {
    async fn fetch_product_by_sku(&self, sku: &str) -> Result<ProductRecord, LookupError> {
        *self.calls.lock() += 1;
        let mode = *self.mode.lock();
        match mode {
            Mode::Found => {
                let now = Utc::now();
                Ok(ProductRecord {
                    id: ProductId(1),
                    sku: sku.to_string(),
                    name: "Widget".to_string(),
                    description: "A widget".to_string(),
                    price: Decimal::new(999, 2),
                    image_url: None,
                    created_at: now,
                    updated_at: now,
                })
            }
            Mode::Missing => Err(LookupError::NotFound(sku.to_string())),
            Mode::Failing => Err(LookupError::Transient("503 Service Unavailable".to_string())),
            Mode::Hanging => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(LookupError::Transient("too late".to_string()))
            }
        }
    }
}

struct Harness {
    stock: StockClient,
    inventory: InventoryClient,
    service: Arc<ProductService>,
    breaker: Arc<CircuitBreaker>,
    clock: ManualClock,
}

fn harness() -> Harness {
    let (actor, client) = inventory_actor::new(16);
    tokio::spawn(actor.run(()));
    let inventory = InventoryClient::new(client);

    let clock = ManualClock::new();
    let config = CircuitBreakerConfig {
        failure_rate_threshold: 50.0,
        sliding_window_size: 4,
        minimum_number_of_calls: Some(2),
        reset_timeout: Duration::from_secs(30),
        call_timeout: Duration::from_millis(50),
    };
    let breaker = Arc::new(CircuitBreaker::new(
        "productServiceCircuitBreaker",
        config,
        Arc::new(clock.clone()),
    ));
    let service = Arc::new(ProductService::default());
    let lookup = GuardedLookup::new(service.clone(), breaker.clone());

    Harness {
        stock: StockClient::new(inventory.clone(), Arc::new(lookup)),
        inventory,
        service,
        breaker,
        clock,
    }
}

async fn quantity(inventory: &InventoryClient, sku: &str) -> u32 {
    inventory
        .find_by_sku(sku)
        .await
        .unwrap()
        .expect("record missing")
        .quantity
}

#[tokio::test]
async fn test_confirmed_product_updates_quantity() {
    let h = harness();
    h.inventory.insert("A1", 0).await.unwrap();

    let record = h.stock.set_quantity("A1", 12).await.unwrap();
    assert_eq!(record.quantity, 12);
    assert_eq!(quantity(&h.inventory, "A1").await, 12);
    assert_eq!(h.service.calls(), 1);
}

#[tokio::test]
async fn test_unknown_product_leaves_quantity_unchanged() {
    let h = harness();
    h.inventory.insert("A1", 5).await.unwrap();
    h.service.set(Mode::Missing);

    let result = h.stock.set_quantity("A1", 9).await;
    assert!(matches!(result, Err(InventoryError::NotFound(_))));
    assert_eq!(quantity(&h.inventory, "A1").await, 5);

    // A definitive "no" does not count against the product service
    assert_eq!(h.breaker.metrics().failed_calls, 0);
}

#[tokio::test]
async fn test_invalid_quantity_is_rejected_without_lookup() {
    let h = harness();
    h.inventory.insert("A1", 5).await.unwrap();

    let result = h.stock.set_quantity("A1", -1).await;
    assert!(matches!(result, Err(InventoryError::Validation(_))));
    assert_eq!(h.service.calls(), 0);
    assert_eq!(quantity(&h.inventory, "A1").await, 5);
}

#[tokio::test]
async fn test_missing_record_is_reported_without_lookup() {
    let h = harness();

    let result = h.stock.set_quantity("GHOST", 3).await;
    assert!(matches!(result, Err(InventoryError::NotFound(_))));
    assert_eq!(h.service.calls(), 0);
}

#[tokio::test]
async fn test_failing_service_opens_breaker_and_denies_writes() {
    let h = harness();
    h.inventory.insert("A1", 5).await.unwrap();
    h.service.set(Mode::Failing);

    for _ in 0..2 {
        let result = h.stock.set_quantity("A1", 9).await;
        assert!(matches!(result, Err(InventoryError::ServiceUnavailable(_))));
    }
    assert_eq!(h.breaker.state(), CircuitState::Open);
    assert_eq!(h.service.calls(), 2);

    // Open: the service is not called at all
    let result = h.stock.set_quantity("A1", 9).await;
    match result {
        Err(InventoryError::ServiceUnavailable(reason)) => {
            assert!(reason.contains("cannot confirm sku A1"));
        }
        other => panic!("expected ServiceUnavailable, got {other:?}"),
    }
    assert_eq!(h.service.calls(), 2);
    assert_eq!(quantity(&h.inventory, "A1").await, 5);
}

#[tokio::test]
async fn test_breaker_recovers_after_reset_timeout() {
    let h = harness();
    h.inventory.insert("A1", 5).await.unwrap();
    h.service.set(Mode::Failing);
    for _ in 0..2 {
        let _ = h.stock.set_quantity("A1", 9).await;
    }
    assert_eq!(h.breaker.state(), CircuitState::Open);

    h.service.set(Mode::Found);
    h.clock.advance(Duration::from_secs(31));

    let record = h.stock.set_quantity("A1", 9).await.unwrap();
    assert_eq!(record.quantity, 9);
    assert_eq!(h.breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let h = harness();
    h.inventory.insert("A1", 5).await.unwrap();
    h.service.set(Mode::Hanging);

    let result = h.stock.set_quantity("A1", 9).await;
    match result {
        Err(InventoryError::ServiceUnavailable(reason)) => {
            assert!(reason.contains("timed out"));
        }
        other => panic!("expected ServiceUnavailable, got {other:?}"),
    }
    assert_eq!(h.breaker.metrics().failed_calls, 1);
    assert_eq!(quantity(&h.inventory, "A1").await, 5);
}

#[tokio::test]
async fn test_create_inventory_requires_confirmed_product() {
    let h = harness();

    let record = h.stock.create_inventory("A1", 3).await.unwrap();
    assert_eq!(record.quantity, 3);

    h.service.set(Mode::Missing);
    let result = h.stock.create_inventory("B2", 3).await;
    assert!(matches!(result, Err(InventoryError::NotFound(_))));
    assert!(h.inventory.find_by_sku("B2").await.unwrap().is_none());

    h.service.set(Mode::Found);
    let result = h.stock.create_inventory("A1", 1).await;
    assert!(matches!(result, Err(InventoryError::Conflict(_))));
}

#[tokio::test]
async fn test_reads_and_deletes_skip_the_lookup() {
    let h = harness();
    h.inventory.insert("A1", 2).await.unwrap();
    h.inventory.insert("B2", 4).await.unwrap();
    h.service.set(Mode::Failing);

    assert_eq!(h.stock.list_inventory().await.unwrap().len(), 2);
    assert_eq!(h.stock.get_inventory("B2").await.unwrap().quantity, 4);
    assert!(matches!(
        h.stock.get_inventory("C3").await,
        Err(InventoryError::NotFound(_))
    ));
    assert_eq!(h.stock.delete_inventory("A1").await.unwrap().sku, "A1");
    assert_eq!(h.service.calls(), 0);
}
