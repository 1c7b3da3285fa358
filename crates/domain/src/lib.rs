//! Canonical order record shared by the stream consumer, the stores and the
//! lookup endpoint, plus the validation contract every inbound order passes
//! before it may be persisted or cached.

pub mod errors;
#[cfg(feature = "fake")]
pub mod fake;
pub mod order;
pub mod validation;

pub use errors::DomainError;
pub use order::{Delivery, Item, Order, Payment};
pub use validation::{OrderValidator, SchemaValidator};
