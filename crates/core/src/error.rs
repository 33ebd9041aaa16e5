//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, stock rules). Storage failures belong to the store crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing required input. The caller can re-prompt.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A debit would drive an item's quantity below zero.
    #[error(
        "insufficient stock for {item_id}: {available} available, {requested} requested"
    )]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn insufficient_stock(item_id: impl Into<String>, available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            item_id: item_id.into(),
            available,
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_both_quantities() {
        let err = DomainError::insufficient_stock("CHE0001", 30, 40);
        assert_eq!(
            err.to_string(),
            "insufficient stock for CHE0001: 30 available, 40 requested"
        );
    }

    #[test]
    fn constructors_pick_the_right_variant() {
        assert!(matches!(DomainError::validation("x"), DomainError::Validation(_)));
        assert!(matches!(DomainError::not_found("x"), DomainError::NotFound(_)));
        assert!(matches!(DomainError::invalid_id("x"), DomainError::InvalidId(_)));
    }
}
