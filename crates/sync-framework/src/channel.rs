//! # Event Channel
//!
//! Topic-based publish/subscribe with **at-least-once** delivery.
//!
//! ## Delivery guarantees
//!
//! - **At-least-once**: a delivery is retried until its handler succeeds, the handler rejects
//!   it, or the retry policy is exhausted. Handlers must therefore be idempotent.
//! - **No ordering**: deliveries run as independent tasks. Two events for the same key can be
//!   handled in either order, or at the same time.
//! - **Retained until subscribed**: events published to a topic nobody listens on yet are kept
//!   and handed to the first subscriber.
//! - **Dead letters**: a delivery that is rejected, or that keeps failing, ends up in the
//!   [`DeadLetterSink`] together with its attempt count and last error. Nothing is dropped
//!   silently.
//!
//! A handler panic is caught and treated like a transient failure.
//!
//! ```rust
//! use sync_framework::channel::{
//!     ChannelConfig, DeadLetterQueue, Delivery, EventChannel, EventHandler, HandlerError,
//!     InMemoryEventChannel,
//! };
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Print;
//!
//! #[async_trait]
//! impl EventHandler for Print {
//!     async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError> {
//!         println!("{} -> {}", delivery.topic, delivery.payload_str());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let dlq = Arc::new(DeadLetterQueue::new());
//!     let channel = InMemoryEventChannel::new(ChannelConfig::default(), dlq.clone());
//!
//!     channel.publish("greetings", b"hello".to_vec()).await.unwrap();
//!     channel.subscribe("greetings", Arc::new(Print)).await.unwrap();
//!
//!     channel.wait_idle().await;
//!     assert!(dlq.is_empty());
//! }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// One attempt at handing an event to one subscriber.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Identifies the published event; redeliveries and duplicates share it.
    pub id: Uuid,
    pub topic: String,
    pub payload: Vec<u8>,
    /// 1 for the first attempt.
    pub attempt: u32,
}

impl Delivery {
    fn new(topic: &str, payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            payload,
            attempt: 0,
        }
    }

    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Why a handler did not process a delivery.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    /// Worth retrying later.
    #[error("transient failure: {0}")]
    Transient(String),
    /// Will never succeed; goes straight to the dead-letter sink.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Consumer of deliveries on one topic.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("event channel is closed")]
    Closed,
}

/// The publish/subscribe surface services depend on.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Fire-and-forget. Fails only when the channel no longer accepts events.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError>;

    /// Registers `handler` for every event on `topic`, including events retained so far.
    async fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), ChannelError>;
}

/// Redelivery schedule for transient failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Attempts, the first one included, before a delivery is dead-lettered.
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,
    pub multiplier: f64,
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before redelivering after failed attempt number `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }

    pub fn validate(&self) -> Result<(), RetryPolicyError> {
        if self.max_attempts == 0 {
            return Err(RetryPolicyError::ZeroAttempts);
        }
        if !(self.multiplier.is_finite() && self.multiplier >= 1.0) {
            return Err(RetryPolicyError::InvalidMultiplier(self.multiplier));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(RetryPolicyError::BackoffRange {
                initial: self.initial_backoff,
                max: self.max_backoff,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryPolicyError {
    #[error("maxAttempts must be at least 1")]
    ZeroAttempts,
    #[error("multiplier must be a finite number >= 1, got {0}")]
    InvalidMultiplier(f64),
    #[error("initialBackoff {initial:?} exceeds maxBackoff {max:?}")]
    BackoffRange { initial: Duration, max: Duration },
}

/// An event that could not be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    pub topic: String,
    pub event: String,
    pub attempt_count: u32,
    pub last_error: String,
}

/// Final destination of undeliverable events.
pub trait DeadLetterSink: Send + Sync {
    fn dead_letter(&self, letter: DeadLetter);
}

/// In-memory [`DeadLetterSink`] that keeps every letter for inspection.
#[derive(Debug, Default)]
pub struct DeadLetterQueue {
    letters: Mutex<Vec<DeadLetter>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn letters(&self) -> Vec<DeadLetter> {
        self.letters.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.letters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.lock().is_empty()
    }
}

impl DeadLetterSink for DeadLetterQueue {
    fn dead_letter(&self, letter: DeadLetter) {
        self.letters.lock().push(letter);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelConfig {
    pub retry: RetryPolicy,
    /// Hands every event to each subscriber twice. Meant for exercising idempotent handlers.
    pub duplicate_deliveries: bool,
}

#[derive(Default)]
struct Topic {
    handlers: Vec<Arc<dyn EventHandler>>,
    backlog: Vec<Delivery>,
}

struct Shared {
    config: ChannelConfig,
    topics: Mutex<HashMap<String, Topic>>,
    dead_letters: Arc<dyn DeadLetterSink>,
    /// Deliveries handed to a subscriber and not yet settled.
    pending: AtomicUsize,
    idle: Notify,
    closed: AtomicBool,
    stopped: AtomicBool,
    stop: Notify,
    events_published: AtomicU64,
}

impl Shared {
    fn settle(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn dead_letter(&self, delivery: &Delivery, last_error: String) {
        error!(
            topic = %delivery.topic,
            id = %delivery.id,
            attempt = delivery.attempt,
            error = %last_error,
            "Delivery dead-lettered"
        );
        self.dead_letters.dead_letter(DeadLetter {
            topic: delivery.topic.clone(),
            event: delivery.payload_str(),
            attempt_count: delivery.attempt,
            last_error,
        });
    }
}

/// Process-local [`EventChannel`].
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct InMemoryEventChannel {
    shared: Arc<Shared>,
}

impl InMemoryEventChannel {
    pub fn new(config: ChannelConfig, dead_letters: Arc<dyn DeadLetterSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                topics: Mutex::new(HashMap::new()),
                dead_letters,
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
                closed: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                stop: Notify::new(),
                events_published: AtomicU64::new(0),
            }),
        }
    }

    pub fn events_published(&self) -> u64 {
        self.shared.events_published.load(Ordering::Relaxed)
    }

    /// Deliveries in flight or waiting for a retry.
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Resolves once no delivery is in flight or waiting for a retry.
    ///
    /// Events retained for a topic without subscribers do not count.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.shared.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stops accepting publications and subscriptions. Deliveries already underway continue.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            info!("Event channel closed");
        }
    }

    /// Closes the channel and waits up to `grace` for deliveries to settle.
    ///
    /// Deliveries still waiting for a retry afterwards are dropped, and subscribers are released.
    pub async fn shutdown(&self, grace: Duration) {
        self.close();
        if tokio::time::timeout(grace, self.wait_idle()).await.is_err() {
            warn!(pending = self.pending(), "Deliveries still pending at shutdown");
        }
        self.shared.stopped.store(true, Ordering::SeqCst);
        self.shared.stop.notify_waiters();
        self.shared.topics.lock().clear();
        info!(published = self.events_published(), "Event channel shut down");
    }

    fn dispatch(&self, handler: &Arc<dyn EventHandler>, delivery: &Delivery) {
        let copies = if self.shared.config.duplicate_deliveries {
            2
        } else {
            1
        };
        for _ in 0..copies {
            self.shared.pending.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(deliver(
                self.shared.clone(),
                handler.clone(),
                delivery.clone(),
            ));
        }
    }
}

#[async_trait]
impl EventChannel for InMemoryEventChannel {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        let delivery = Delivery::new(topic, payload);
        self.shared.events_published.fetch_add(1, Ordering::Relaxed);

        let handlers = {
            let mut topics = self.shared.topics.lock();
            let entry = topics.entry(topic.to_string()).or_default();
            if entry.handlers.is_empty() {
                debug!(topic, id = %delivery.id, "No subscriber yet, event retained");
                entry.backlog.push(delivery);
                return Ok(());
            }
            entry.handlers.clone()
        };

        debug!(topic, id = %delivery.id, subscribers = handlers.len(), "Event published");
        for handler in &handlers {
            self.dispatch(handler, &delivery);
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), ChannelError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        let backlog = {
            let mut topics = self.shared.topics.lock();
            let entry = topics.entry(topic.to_string()).or_default();
            entry.handlers.push(handler.clone());
            std::mem::take(&mut entry.backlog)
        };

        info!(topic, retained = backlog.len(), "Subscribed");
        for delivery in &backlog {
            self.dispatch(&handler, delivery);
        }
        Ok(())
    }
}

/// Drives one delivery to a terminal outcome: handled, dead-lettered or dropped at shutdown.
async fn deliver(shared: Arc<Shared>, handler: Arc<dyn EventHandler>, mut delivery: Delivery) {
    let policy = &shared.config.retry;
    loop {
        delivery.attempt += 1;

        let attempt = {
            let handler = handler.clone();
            let delivery = delivery.clone();
            tokio::spawn(async move { handler.handle(&delivery).await })
        };
        let outcome = match attempt.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(HandlerError::Transient("handler panicked".to_string())),
            Err(e) => Err(HandlerError::Transient(e.to_string())),
        };

        match outcome {
            Ok(()) => {
                debug!(topic = %delivery.topic, id = %delivery.id, attempt = delivery.attempt, "Delivered");
                break;
            }
            Err(HandlerError::Rejected(reason)) => {
                shared.dead_letter(&delivery, reason);
                break;
            }
            Err(HandlerError::Transient(reason)) if delivery.attempt >= policy.max_attempts => {
                shared.dead_letter(&delivery, reason);
                break;
            }
            Err(HandlerError::Transient(reason)) => {
                let backoff = policy.backoff_for(delivery.attempt);
                warn!(
                    topic = %delivery.topic,
                    id = %delivery.id,
                    attempt = delivery.attempt,
                    ?backoff,
                    error = %reason,
                    "Delivery failed, requeued"
                );
                let stop = shared.stop.notified();
                if !shared.stopped.load(Ordering::SeqCst) {
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = stop => {}
                    }
                }
                if shared.stopped.load(Ordering::SeqCst) {
                    warn!(topic = %delivery.topic, id = %delivery.id, "Delivery dropped at shutdown");
                    break;
                }
            }
        }
    }
    shared.settle();
}
