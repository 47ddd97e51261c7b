//! Custom error types for tally
//!
//! This module defines the error hierarchy for the ledger using thiserror.
//! Validation failures (`InvalidAmount`, `SameAccount`, `AccountNotFound`)
//! are always raised before anything is mutated.

use thiserror::Error;

use crate::models::entry::EntryValidationError;
use crate::models::{Money, PaymentMethodId};

/// The main error type for tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// A strictly positive amount was required
    #[error("Invalid amount: {0} (must be greater than zero)")]
    InvalidAmount(Money),

    /// Transfer source and destination are the same payment method
    #[error("Cannot transfer from a payment method to itself ({0})")]
    SameAccount(PaymentMethodId),

    /// The durable write failed; the attempted mutation was not applied
    #[error("Storage error: {0}")]
    StorageFailure(String),

    /// A payment method identifier with no corresponding record
    #[error("Payment method not found: {0}")]
    AccountNotFound(String),

    /// Any other entity that could not be found
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Raised by the CLI overdraft pre-check, never by the engine
    #[error("Insufficient funds in '{method}': need {needed}, have {available}")]
    InsufficientFunds {
        method: String,
        needed: Money,
        available: Money,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl TallyError {
    /// Create a "not found" error for payment methods
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::AccountNotFound(identifier.into())
    }

    /// Create a "not found" error for actors
    pub fn actor_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Actor",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for ledger entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entry",
            identifier: identifier.into(),
        }
    }

    /// A balance update that would leave the representable range
    pub fn balance_overflow(account: PaymentMethodId, amount: Money) -> Self {
        Self::Validation(format!(
            "Applying {} to the balance of {} would overflow",
            amount, account
        ))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::AccountNotFound(_))
    }

    /// Check if this error was raised before any mutation took place
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidAmount(_)
                | Self::SameAccount(_)
                | Self::AccountNotFound(_)
        )
    }

    /// Check if this is a persistence failure
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<EntryValidationError> for TallyError {
    fn from(err: EntryValidationError) -> Self {
        match err {
            EntryValidationError::NonPositiveAmount(amount) => Self::InvalidAmount(amount),
            EntryValidationError::SameAccount(id) => Self::SameAccount(id),
        }
    }
}

/// Result type alias for tally operations
pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TallyError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_account_not_found() {
        let err = TallyError::account_not_found("Cash");
        assert_eq!(err.to_string(), "Payment method not found: Cash");
        assert!(err.is_not_found());
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_amount_display() {
        let err = TallyError::InvalidAmount(Money::zero());
        assert_eq!(err.to_string(), "Invalid amount: 0.00 (must be greater than zero)");
        assert!(err.is_validation());
        assert!(!err.is_storage_failure());
    }

    #[test]
    fn test_balance_overflow_is_validation() {
        let err = TallyError::balance_overflow(PaymentMethodId::new(), Money::from_minor(100));
        assert!(err.is_validation());
        assert!(err.to_string().contains("would overflow"));
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = TallyError::InsufficientFunds {
            method: "Cash".into(),
            needed: Money::from_minor(5000),
            available: Money::from_minor(3000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in 'Cash': need 50.00, have 30.00"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TallyError = io_err.into();
        assert!(matches!(err, TallyError::Io(_)));
    }
}
