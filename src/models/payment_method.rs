//! Payment method model
//!
//! A payment method is anything money is held in: a wallet of cash, a bank
//! account, an e-wallet. Retiring one is a soft delete; its entries stay valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PaymentMethodId;

/// A payment method (the "account" of the ledger)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Unique identifier
    pub id: PaymentMethodId,

    /// Display name (e.g., "Cash", "BCA")
    pub name: String,

    /// When the method was retired; `None` while active
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    /// When the method was created
    pub created_at: DateTime<Utc>,

    /// When the method was last modified
    pub updated_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Create a new, active payment method
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentMethodId::new(),
            name: name.into(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this method has been retired
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Retire this method, keeping its history
    pub fn retire(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Bring a retired method back into use
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Validate the payment method
    pub fn validate(&self) -> Result<(), PaymentMethodValidationError> {
        if self.name.trim().is_empty() {
            return Err(PaymentMethodValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(PaymentMethodValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_deleted() {
            write!(f, "{} (retired)", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Validation errors for payment methods
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for PaymentMethodValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Payment method name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Payment method name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for PaymentMethodValidationError {}
