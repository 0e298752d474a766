//! Error types for the Inventory actor and the stock write path.

use thiserror::Error;

/// Errors that can occur during inventory operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// No inventory record (or, on the write path, no product) for this SKU.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Another inventory record already holds this SKU.
    #[error("SKU already has an inventory record: {0}")]
    Conflict(String),

    /// Bad input; retrying will not help.
    #[error("Invalid inventory request: {0}")]
    Validation(String),

    /// The product service could not confirm the SKU.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
