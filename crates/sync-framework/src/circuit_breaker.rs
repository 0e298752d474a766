//! # Circuit Breaker
//!
//! Guards one synchronous remote operation so that a failing dependency is not hammered by every
//! caller in the process.
//!
//! ```text
//!                 failure rate >= threshold
//!   ┌──────────┐  (window holds >= minimum calls)   ┌──────────┐
//!   │  CLOSED  │ ─────────────────────────────────► │   OPEN   │ ◄──┐
//!   └──────────┘                                    └──────────┘    │
//!        ▲                                               │          │ trial
//!        │ trial succeeds                  reset timeout │          │ fails
//!        │ (window cleared)                    elapsed   ▼          │
//!        │                                         ┌───────────┐    │
//!        └──────────────────────────────────────── │ HALF-OPEN │ ───┘
//!                                                  └───────────┘
//! ```
//!
//! * **Count-based window**: the outcome of the last `sliding_window_size` calls is buffered.
//! * **Single trial**: in `HALF-OPEN` exactly one call goes through; everybody else is
//!   short-circuited until it settles. A trial whose future is dropped gives its slot back.
//! * **Timeouts**: every guarded call is bounded by `call_timeout`; a timeout is a failure.
//!
//! Which errors count as failures is up to the caller's error type through [`TripsBreaker`]. A
//! "not found" answer, for instance, proves the remote side is healthy and should not trip.
//!
//! State, window and trial slot are all kept behind one mutex so a transition and the counters
//! it depends on always move together.

use crate::clock::Clock;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Calls pass through and are recorded
    Closed,
    /// Calls are rejected without reaching the remote side
    Open,
    /// One trial call decides whether to close again
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircuitBreakerConfig {
    /// Failure rate, in percent, at which the breaker opens
    pub failure_rate_threshold: f64,
    /// Number of most recent calls whose outcome is buffered
    pub sliding_window_size: usize,
    /// Calls that must be buffered before the failure rate is considered.
    /// Defaults to the window size.
    pub minimum_number_of_calls: Option<usize>,
    /// How long the breaker stays open before allowing a trial call
    #[serde(with = "humantime_serde")]
    pub reset_timeout: Duration,
    /// Upper bound on a single guarded call
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            minimum_number_of_calls: None,
            reset_timeout: Duration::from_secs(30),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn minimum_calls(&self) -> usize {
        self.minimum_number_of_calls
            .unwrap_or(self.sliding_window_size)
    }

    pub fn validate(&self) -> Result<(), BreakerConfigError> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 100.0) {
            return Err(BreakerConfigError::InvalidThreshold(
                self.failure_rate_threshold,
            ));
        }
        if self.sliding_window_size == 0 {
            return Err(BreakerConfigError::EmptyWindow);
        }
        let minimum = self.minimum_calls();
        if minimum == 0 || minimum > self.sliding_window_size {
            return Err(BreakerConfigError::InvalidMinimumCalls {
                minimum,
                window: self.sliding_window_size,
            });
        }
        if self.reset_timeout.is_zero() {
            return Err(BreakerConfigError::ZeroDuration("resetTimeout"));
        }
        if self.call_timeout.is_zero() {
            return Err(BreakerConfigError::ZeroDuration("callTimeout"));
        }
        Ok(())
    }
}

/// Rejected circuit breaker configuration
#[derive(Debug, Error, PartialEq)]
pub enum BreakerConfigError {
    #[error("failureRateThreshold must be within (0, 100], got {0}")]
    InvalidThreshold(f64),
    #[error("slidingWindowSize must be at least 1")]
    EmptyWindow,
    #[error("minimumNumberOfCalls must be within 1..={window}, got {minimum}")]
    InvalidMinimumCalls { minimum: usize, window: usize },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Classifies an error returned by a guarded operation.
pub trait TripsBreaker {
    /// `true` when the error says the remote side is unhealthy and should count as a failure.
    fn trips_breaker(&self) -> bool;
}

/// Why a guarded call did not produce the operation's own result.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error("circuit breaker '{name}' is open")]
    ShortCircuited { name: String },
    #[error("call timed out after {0:?}")]
    TimedOut(Duration),
    #[error("{0}")]
    Inner(E),
}

/// Snapshot of a breaker for monitoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerMetrics {
    pub state: CircuitState,
    /// Outcomes currently held in the sliding window
    pub buffered_calls: usize,
    /// Failures among the buffered outcomes
    pub failed_calls: usize,
    /// Failure rate of the window in percent, 0 when empty
    pub failure_rate: f64,
}

#[derive(Debug)]
struct Inner {
    config: CircuitBreakerConfig,
    state: CircuitState,
    /// `true` marks a failed call
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    /// Bumped by `reload` so that calls started before it cannot touch the fresh state
    generation: u64,
}

impl Inner {
    fn failed_calls(&self) -> usize {
        self.window.iter().filter(|failed| **failed).count()
    }

    fn failure_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.failed_calls() as f64 * 100.0 / self.window.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitKind {
    Normal,
    Trial,
}

/// Circuit breaker shared by every caller of one guarded operation
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker. The configuration is expected to be validated already.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            clock,
            inner: Mutex::new(Inner {
                config,
                state: CircuitState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                trial_in_flight: false,
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn metrics(&self) -> BreakerMetrics {
        let inner = self.inner.lock();
        BreakerMetrics {
            state: inner.state,
            buffered_calls: inner.window.len(),
            failed_calls: inner.failed_calls(),
            failure_rate: inner.failure_rate(),
        }
    }

    /// Swaps in a new configuration and resets the breaker to `CLOSED` with an empty window.
    pub fn reload(&self, config: CircuitBreakerConfig) {
        let mut inner = self.inner.lock();
        inner.config = config;
        inner.state = CircuitState::Closed;
        inner.window.clear();
        inner.opened_at = None;
        inner.trial_in_flight = false;
        inner.generation += 1;
        info!(breaker = %self.name, "Circuit breaker reloaded");
    }

    /// Runs `op` through the breaker.
    ///
    /// Returns [`CallError::ShortCircuited`] without calling `op` when the breaker is open, or
    /// half-open with its trial already in flight.
    pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<T, CallError<E>>
    where
        E: TripsBreaker,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let (permit, call_timeout) = self.acquire::<E>()?;

        match tokio::time::timeout(call_timeout, op()).await {
            Ok(Ok(value)) => {
                permit.settle(false);
                Ok(value)
            }
            Ok(Err(e)) => {
                permit.settle(e.trips_breaker());
                Err(CallError::Inner(e))
            }
            Err(_) => {
                debug!(breaker = %self.name, ?call_timeout, "Call timed out");
                permit.settle(true);
                Err(CallError::TimedOut(call_timeout))
            }
        }
    }

    /// Runs `op(args)` through the breaker, handing over to `fallback` when the call was
    /// short-circuited, timed out or failed in a way that trips the breaker.
    ///
    /// Errors that do not trip the breaker (a definitive "not found", say) are returned as they
    /// are; the fallback never sees them.
    pub async fn call_with_fallback<A, T, E, F, Fut, Fb>(
        &self,
        args: A,
        op: F,
        fallback: Fb,
    ) -> Result<T, E>
    where
        A: Clone,
        E: TripsBreaker,
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Fb: FnOnce(A, CallError<E>) -> Result<T, E>,
    {
        let call_args = args.clone();
        match self.call(move || op(call_args)).await {
            Ok(value) => Ok(value),
            Err(CallError::Inner(e)) if !e.trips_breaker() => Err(e),
            Err(err) => fallback(args, err),
        }
    }

    fn acquire<E>(&self) -> Result<(Permit<'_>, Duration), CallError<E>> {
        let mut inner = self.inner.lock();
        let kind = match inner.state {
            CircuitState::Closed => Some(PermitKind::Normal),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| self.clock.now().saturating_duration_since(at))
                    .unwrap_or_default();
                if elapsed >= inner.config.reset_timeout {
                    inner.state = CircuitState::HalfOpen;
                    info!(breaker = %self.name, state = %inner.state, "Circuit breaker state changed");
                    inner.trial_in_flight = true;
                    Some(PermitKind::Trial)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen if !inner.trial_in_flight => {
                inner.trial_in_flight = true;
                Some(PermitKind::Trial)
            }
            CircuitState::HalfOpen => None,
        };

        match kind {
            Some(kind) => Ok((
                Permit {
                    breaker: self,
                    kind,
                    generation: inner.generation,
                    settled: false,
                },
                inner.config.call_timeout,
            )),
            None => {
                debug!(breaker = %self.name, state = %inner.state, "Call short-circuited");
                Err(CallError::ShortCircuited {
                    name: self.name.clone(),
                })
            }
        }
    }

    fn record(&self, kind: PermitKind, generation: u64, failed: bool) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }

        match (kind, inner.state) {
            (PermitKind::Normal, CircuitState::Closed) => {
                inner.window.push_back(failed);
                while inner.window.len() > inner.config.sliding_window_size {
                    inner.window.pop_front();
                }
                let failure_rate = inner.failure_rate();
                if inner.window.len() >= inner.config.minimum_calls()
                    && failure_rate >= inner.config.failure_rate_threshold
                {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(self.clock.now());
                    warn!(
                        breaker = %self.name,
                        state = %inner.state,
                        failure_rate,
                        buffered_calls = inner.window.len(),
                        "Circuit breaker state changed"
                    );
                }
            }
            // The breaker moved on while this call was running; its outcome is stale.
            (PermitKind::Normal, _) => {}
            (PermitKind::Trial, _) => {
                inner.trial_in_flight = false;
                if inner.state != CircuitState::HalfOpen {
                    return;
                }
                if failed {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(self.clock.now());
                    warn!(breaker = %self.name, state = %inner.state, "Trial call failed");
                } else {
                    inner.state = CircuitState::Closed;
                    inner.window.clear();
                    inner.opened_at = None;
                    info!(breaker = %self.name, state = %inner.state, "Circuit breaker state changed");
                }
            }
        }
    }

    fn release_trial(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.trial_in_flight = false;
            debug!(breaker = %self.name, "Abandoned trial released");
        }
    }
}

/// Admission to run one call. Dropping an unsettled trial permit frees the trial slot.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    kind: PermitKind,
    generation: u64,
    settled: bool,
}

impl Permit<'_> {
    fn settle(mut self, failed: bool) {
        self.settled = true;
        self.breaker.record(self.kind, self.generation, failed);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.kind == PermitKind::Trial {
            self.breaker.release_trial(self.generation);
        }
    }
}
