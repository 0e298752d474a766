//! Error types for the Product actor.

use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// No product matches the requested id or SKU.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Another product already uses this SKU.
    #[error("SKU already in use: {0}")]
    Conflict(String),

    /// The request payload broke a field rule.
    #[error("Invalid product: {0}")]
    Validation(String),

    /// A lifecycle event could not be handed to the event channel.
    #[error("Event publication failed: {0}")]
    Publish(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
