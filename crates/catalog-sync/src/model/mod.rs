//! Domain records, request payloads and lifecycle events.

pub mod events;
pub mod inventory;
pub mod product;

pub use events::*;
pub use inventory::*;
pub use product::*;
