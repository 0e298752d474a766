//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `ResourceClient` and `ResourceActor`.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use std::fmt::{self, Debug, Display};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Addresses a single entity, either by its store-assigned id or by its unique key.
pub enum Target<T: ActorEntity> {
    Id(T::Id),
    Key(T::Key),
}

impl<T: ActorEntity> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Id(id) => Target::Id(id.clone()),
            Target::Key(key) => Target::Key(key.clone()),
        }
    }
}

impl<T: ActorEntity> PartialEq for Target<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Target::Id(a), Target::Id(b)) => a == b,
            (Target::Key(a), Target::Key(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: ActorEntity> Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Target::Key(key) => f.debug_tuple("Key").field(key).finish(),
        }
    }
}

impl<T: ActorEntity> Display for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => write!(f, "{id}"),
            Target::Key(key) => write!(f, "key={key}"),
        }
    }
}

/// Internal message type sent to the actor to request operations.
///
/// # Resource-Oriented Architecture
/// Each actor manages one type of record (the [`ActorEntity`]). Instead of ad-hoc messages for
/// every operation, we standardize around lifecycle operations that apply to any stored record:
///
/// - **Create**: Uses [`ActorEntity::Create`] to build and insert a record. Rejected with
///   [`FrameworkError::Conflict`] when the key is taken.
/// - **Get / List**: Retrieval by [`Target`], or every record.
/// - **Update**: Conditional mutation of the record found by [`Target`] through
///   [`ActorEntity::Update`]. [`FrameworkError::NotFound`] when nothing matches.
/// - **Delete**: Removes the record found by [`Target`] and returns it.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        target: Target<T>,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        target: Target<T>,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        target: Target<T>,
        respond_to: Response<T>,
    },
}
