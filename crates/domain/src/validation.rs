use validator::Validate;

use crate::{DomainError, Order};

/// Validate-or-reject capability applied to every inbound order before it is
/// eligible for persistence or caching.
pub trait OrderValidator: Send + Sync {
    fn validate(&self, order: &Order) -> Result<(), DomainError>;
}

/// Validator backed by the derive rules declared on [`Order`] and its parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl OrderValidator for SchemaValidator {
    fn validate(&self, order: &Order) -> Result<(), DomainError> {
        Validate::validate(order).map_err(|e| DomainError::ValidationError(e.to_string()))
    }
}
