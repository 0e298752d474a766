//! # Mock Framework & Testing Guide
//!
//! The `MockClient<T>` type hands out a real `ResourceClient<T>` whose requests are answered from
//! a queue of expectations instead of a running actor. It lets you test logic *around* a client
//! (orchestration, error mapping, write-path guards) without spawning any actors.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Example
//!
//! ```rust
//! use sync_framework::mock::MockClient;
//! use sync_framework::{ActorEntity, FrameworkError, Target};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Item { id: u32, code: String }
//! #[derive(Debug)] struct ItemCreate;
//! #[derive(Debug)] struct ItemUpdate;
//! #[derive(Debug, thiserror::Error)] #[error("Err")] struct ItemError;
//!
//! #[async_trait]
//! impl ActorEntity for Item {
//!     type Id = u32; type Key = String; type Create = ItemCreate; type Update = ItemUpdate;
//!     type Context = (); type Error = ItemError;
//!     fn key(&self) -> &String { &self.code }
//!     fn from_create_params(id: u32, _: ItemCreate) -> Result<Self, ItemError> {
//!         Ok(Self { id, code: String::new() })
//!     }
//!     async fn on_update(&mut self, _: ItemUpdate, _: &()) -> Result<(), ItemError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Item>::new();
//!     let client = mock.client();
//!
//!     // Simulate a downstream failure
//!     mock.expect_get(Target::Key("A1".into()))
//!         .return_err(FrameworkError::ActorClosed);
//!
//!     let result = client.get(Target::Key("A1".into())).await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! A request that does not match the next expectation is answered with
//! [`FrameworkError::ActorDropped`] and recorded; [`MockClient::verify`] then fails the test.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response, Target};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response it should receive.
enum Expectation<T: ActorEntity> {
    Create {
        response: Result<T, FrameworkError>,
    },
    Get {
        target: Target<T>,
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Update {
        target: Target<T>,
        response: Result<T, FrameworkError>,
    },
    Delete {
        target: Target<T>,
        response: Result<T, FrameworkError>,
    },
}

struct MockState<T: ActorEntity> {
    expectations: VecDeque<Expectation<T>>,
    unexpected: Vec<String>,
}

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Arc<Mutex<MockState<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            unexpected: Vec::new(),
        }));
        let worker_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = worker_state.lock().expectations.pop_front();
                if let Some(mismatch) = answer(request, expectation) {
                    worker_state.lock().unexpected.push(mismatch);
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn push(&self, expectation: Expectation<T>) {
        self.state.lock().expectations.push_back(expectation);
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, |response| Expectation::Create { response })
    }

    /// Expects a `get` operation on `target`.
    pub fn expect_get(&mut self, target: Target<T>) -> ExpectationBuilder<'_, T, Option<T>> {
        ExpectationBuilder::new(self, move |response| Expectation::Get { target, response })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<'_, T, Vec<T>> {
        ExpectationBuilder::new(self, |response| Expectation::List { response })
    }

    /// Expects an `update` operation on `target`.
    pub fn expect_update(&mut self, target: Target<T>) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, move |response| Expectation::Update { target, response })
    }

    /// Expects a `delete` operation on `target`.
    pub fn expect_delete(&mut self, target: Target<T>) -> ExpectationBuilder<'_, T, T> {
        ExpectationBuilder::new(self, move |response| Expectation::Delete { target, response })
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let state = self.state.lock();
        assert!(
            state.unexpected.is_empty(),
            "Unexpected requests: {:?}",
            state.unexpected
        );
        assert!(
            state.expectations.is_empty(),
            "Not all expectations were met. {} remaining",
            state.expectations.len()
        );
    }
}

/// Builder that completes an expectation with its response.
pub struct ExpectationBuilder<'a, T: ActorEntity, R> {
    mock: &'a MockClient<T>,
    build: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + 'a>,
}

impl<'a, T: ActorEntity, R> ExpectationBuilder<'a, T, R> {
    fn new(
        mock: &'a MockClient<T>,
        build: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + 'a,
    ) -> Self {
        Self {
            mock,
            build: Box::new(build),
        }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.mock.push((self.build)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.mock.push((self.build)(Err(error)));
    }
}

/// Answers `request` from `expectation`; returns a description of any mismatch.
fn answer<T: ActorEntity>(
    request: ResourceRequest<T>,
    expectation: Option<Expectation<T>>,
) -> Option<String> {
    match (request, expectation) {
        (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
            let _ = respond_to.send(response);
            None
        }
        (
            ResourceRequest::Get { target, respond_to },
            Some(Expectation::Get {
                target: expected,
                response,
            }),
        ) if target == expected => {
            let _ = respond_to.send(response);
            None
        }
        (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
            let _ = respond_to.send(response);
            None
        }
        (
            ResourceRequest::Update {
                target, respond_to, ..
            },
            Some(Expectation::Update {
                target: expected,
                response,
            }),
        ) if target == expected => {
            let _ = respond_to.send(response);
            None
        }
        (
            ResourceRequest::Delete { target, respond_to },
            Some(Expectation::Delete {
                target: expected,
                response,
            }),
        ) if target == expected => {
            let _ = respond_to.send(response);
            None
        }
        (request, _) => {
            let description = describe(&request);
            fail(request);
            Some(description)
        }
    }
}

fn describe<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { params, .. } => format!("Create({params:?})"),
        ResourceRequest::Get { target, .. } => format!("Get({target})"),
        ResourceRequest::List { .. } => "List".to_string(),
        ResourceRequest::Update { target, update, .. } => format!("Update({target}, {update:?})"),
        ResourceRequest::Delete { target, .. } => format!("Delete({target})"),
    }
}

fn fail<T: ActorEntity>(request: ResourceRequest<T>) {
    let _ = match request {
        ResourceRequest::Create { respond_to, .. } => {
            respond_to.send(Err(FrameworkError::ActorDropped)).map_err(drop)
        }
        ResourceRequest::Get { respond_to, .. } => {
            respond_to.send(Err(FrameworkError::ActorDropped)).map_err(drop)
        }
        ResourceRequest::List { respond_to } => {
            respond_to.send(Err(FrameworkError::ActorDropped)).map_err(drop)
        }
        ResourceRequest::Update { respond_to, .. } => {
            respond_to.send(Err(FrameworkError::ActorDropped)).map_err(drop)
        }
        ResourceRequest::Delete { respond_to, .. } => {
            respond_to.send(Err(FrameworkError::ActorDropped)).map_err(drop)
        }
    };
}

// =============================================================================
// LOW-LEVEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// Use this when a test wants to inspect each request itself and answer it by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is a `Create`.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is a `Get`.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Target<T>, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { target, respond_to }) => Some((target, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is an `Update`.
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Target<T>, T::Update, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            target,
            update,
            respond_to,
        }) => Some((target, update, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is a `Delete`.
pub async fn expect_delete<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Target<T>, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { target, respond_to }) => Some((target, respond_to)),
        _ => None,
    }
}
