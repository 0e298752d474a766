//! # Product Lookup
//!
//! The one synchronous call from Inventory into the Product Authority: "does this SKU exist?".
//!
//! - [`ProductLookup`] is the remote operation itself. Its answers follow HTTP semantics: found,
//!   [`LookupError::NotFound`] (a 404, a healthy "no"), or [`LookupError::Transient`] (timeouts,
//!   5xx, connection failures).
//! - [`CatalogLookup`] implements it in-process over the product actor.
//! - [`GuardedLookup`] wraps any lookup in a [`CircuitBreaker`] plus a fallback. Only
//!   `Transient` errors and timeouts count as failures; `NotFound` passes straight through.

use crate::clients::ProductClient;
use crate::model::ProductRecord;
use crate::product_actor::ProductError;
use async_trait::async_trait;
use std::sync::Arc;
use sync_framework::circuit_breaker::{CallError, CircuitBreaker, TripsBreaker};
use thiserror::Error;
use tracing::{instrument, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    /// The product service answered: no such SKU.
    #[error("Product not found: {0}")]
    NotFound(String),
    /// The product service could not answer this time.
    #[error("Transient lookup failure: {0}")]
    Transient(String),
    /// The fallback refused to confirm the product.
    #[error("{0}")]
    Unavailable(String),
}

impl TripsBreaker for LookupError {
    fn trips_breaker(&self) -> bool {
        matches!(self, LookupError::Transient(_))
    }
}

/// `fetchProductBySku`: resolve a SKU against the Product Authority.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn fetch_product_by_sku(&self, sku: &str) -> Result<ProductRecord, LookupError>;
}

/// [`ProductLookup`] answered by the product actor of this process.
#[derive(Clone)]
pub struct CatalogLookup {
    products: ProductClient,
}

impl CatalogLookup {
    pub fn new(products: ProductClient) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductLookup for CatalogLookup {
    async fn fetch_product_by_sku(&self, sku: &str) -> Result<ProductRecord, LookupError> {
        match self.products.get_product_by_sku(sku).await {
            Ok(product) => Ok(product),
            Err(ProductError::NotFound(_)) => Err(LookupError::NotFound(sku.to_string())),
            Err(e) => Err(LookupError::Transient(e.to_string())),
        }
    }
}

/// Replacement answer used when the guarded call did not produce one.
pub type Fallback =
    Arc<dyn Fn(&str, CallError<LookupError>) -> Result<ProductRecord, LookupError> + Send + Sync>;

/// Default fallback: refuse to confirm the product.
pub fn deny_confirmation(
    sku: &str,
    cause: CallError<LookupError>,
) -> Result<ProductRecord, LookupError> {
    Err(LookupError::Unavailable(format!(
        "product service unavailable, cannot confirm sku {sku}: {cause}"
    )))
}

/// A [`ProductLookup`] behind a circuit breaker.
#[derive(Clone)]
pub struct GuardedLookup {
    lookup: Arc<dyn ProductLookup>,
    breaker: Arc<CircuitBreaker>,
    fallback: Fallback,
}

impl GuardedLookup {
    pub fn new(lookup: Arc<dyn ProductLookup>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            lookup,
            breaker,
            fallback: Arc::new(deny_confirmation),
        }
    }

    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&str, CallError<LookupError>) -> Result<ProductRecord, LookupError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl ProductLookup for GuardedLookup {
    #[instrument(skip(self), fields(breaker = self.breaker.name()))]
    async fn fetch_product_by_sku(&self, sku: &str) -> Result<ProductRecord, LookupError> {
        let lookup = self.lookup.clone();
        let fallback = self.fallback.clone();
        self.breaker
            .call_with_fallback(
                sku.to_string(),
                |sku| async move { lookup.fetch_product_by_sku(&sku).await },
                |sku, cause| {
                    warn!(%sku, %cause, "Product lookup fell back");
                    fallback(&sku, cause)
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use sync_framework::circuit_breaker::{CircuitBreakerConfig, CircuitState};
    use sync_framework::clock::ManualClock;

    fn product(sku: &str) -> ProductRecord {
        let now = Utc::now();
        ProductRecord {
            id: 1.into(),
            sku: sku.to_string(),
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: Decimal::ONE,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Answers from a script, then keeps repeating the last answer.
    struct Scripted {
        answers: Mutex<VecDeque<Result<(), LookupError>>>,
        calls: Mutex<usize>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<(), LookupError>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ProductLookup for Scripted {
        async fn fetch_product_by_sku(&self, sku: &str) -> Result<ProductRecord, LookupError> {
            *self.calls.lock() += 1;
            let mut answers = self.answers.lock();
            let answer = if answers.len() > 1 {
                answers.pop_front()
            } else {
                answers.front().cloned()
            };
            answer.unwrap_or(Ok(())).map(|()| product(sku))
        }
    }

    fn guarded(lookup: Arc<Scripted>) -> GuardedLookup {
        let breaker = CircuitBreaker::new(
            "product-lookup",
            CircuitBreakerConfig::default(),
            Arc::new(ManualClock::new()),
        );
        GuardedLookup::new(lookup, Arc::new(breaker))
    }

    #[tokio::test]
    async fn test_not_found_passes_through_without_tripping() {
        let lookup = Scripted::new(vec![Err(LookupError::NotFound("A1".into()))]);
        let guarded = guarded(lookup.clone());

        for _ in 0..20 {
            assert_eq!(
                guarded.fetch_product_by_sku("A1").await,
                Err(LookupError::NotFound("A1".into()))
            );
        }
        assert_eq!(guarded.breaker().state(), CircuitState::Closed);
        assert_eq!(*lookup.calls.lock(), 20);
    }

    #[tokio::test]
    async fn test_failures_fall_back_and_open_breaker() {
        let lookup = Scripted::new(vec![Err(LookupError::Transient("503".into()))]);
        let guarded = guarded(lookup.clone());

        for _ in 0..10 {
            let result = guarded.fetch_product_by_sku("A1").await;
            assert!(matches!(result, Err(LookupError::Unavailable(_))));
        }
        assert_eq!(guarded.breaker().state(), CircuitState::Open);

        // Short-circuited: the lookup is not called again
        let result = guarded.fetch_product_by_sku("A1").await;
        assert!(matches!(result, Err(LookupError::Unavailable(msg)) if msg.contains("A1")));
        assert_eq!(*lookup.calls.lock(), 10);
    }

    #[tokio::test]
    async fn test_custom_fallback_replaces_answer() {
        let lookup = Scripted::new(vec![Err(LookupError::Transient("timeout".into()))]);
        let guarded = guarded(lookup).with_fallback(|sku, _| Ok(product(sku)));

        let confirmed = guarded.fetch_product_by_sku("A1").await.unwrap();
        assert_eq!(confirmed.sku, "A1");
    }
}
