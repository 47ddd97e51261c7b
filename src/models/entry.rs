//! Ledger entry model
//!
//! An entry is one immutable financial event. The kind is a tagged variant so
//! that only transfers carry a destination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ActorId, EntryId, PaymentMethodId};
use super::money::Money;

/// Summary stored on opening-balance entries
pub const INITIAL_BALANCE_SUMMARY: &str = "Initial balance";

/// What kind of event an entry records, with the payment methods it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    /// Money received into `account`
    Income { account: PaymentMethodId },
    /// Money spent from `account`
    Expense { account: PaymentMethodId },
    /// Money moved between two distinct payment methods
    Transfer {
        source: PaymentMethodId,
        destination: PaymentMethodId,
    },
    /// Opening balance; sets rather than adjusts
    Init { account: PaymentMethodId },
}

impl EntryKind {
    /// The payment method the entry is primarily recorded against
    pub fn source(&self) -> PaymentMethodId {
        match *self {
            Self::Income { account } | Self::Expense { account } | Self::Init { account } => {
                account
            }
            Self::Transfer { source, .. } => source,
        }
    }

    pub fn destination(&self) -> Option<PaymentMethodId> {
        match *self {
            Self::Transfer { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Lowercase name as stored on disk
    pub fn name(&self) -> &'static str {
        match self {
            Self::Income { .. } => "income",
            Self::Expense { .. } => "expense",
            Self::Transfer { .. } => "transfer",
            Self::Init { .. } => "init",
        }
    }
}

/// The balance rule an entry applies to one payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Income,
    Expense,
    TransferOut,
    TransferIn,
    Init,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
            Self::TransferOut => write!(f, "transfer_out"),
            Self::TransferIn => write!(f, "transfer_in"),
            Self::Init => write!(f, "init"),
        }
    }
}

/// One recorded financial event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Kind and the payment methods involved
    pub kind: EntryKind,

    /// Amount; strictly positive except for `Init`
    pub amount: Money,

    /// Who recorded it
    pub actor: ActorId,

    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// When the event happened; the reconciliation sort key
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build an entry of any kind, timestamped now
    pub fn new(kind: EntryKind, amount: Money, actor: ActorId, summary: Option<String>) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            amount,
            actor,
            summary: summary.filter(|s| !s.trim().is_empty()),
            timestamp: Utc::now(),
        }
    }

    pub fn income(
        amount: Money,
        actor: ActorId,
        account: PaymentMethodId,
        summary: Option<String>,
    ) -> Self {
        Self::new(EntryKind::Income { account }, amount, actor, summary)
    }

    pub fn expense(
        amount: Money,
        actor: ActorId,
        account: PaymentMethodId,
        summary: Option<String>,
    ) -> Self {
        Self::new(EntryKind::Expense { account }, amount, actor, summary)
    }

    pub fn transfer(
        amount: Money,
        actor: ActorId,
        source: PaymentMethodId,
        destination: PaymentMethodId,
        summary: Option<String>,
    ) -> Self {
        Self::new(
            EntryKind::Transfer {
                source,
                destination,
            },
            amount,
            actor,
            summary,
        )
    }

    pub fn init(amount: Money, account: PaymentMethodId, system_actor: ActorId) -> Self {
        Self::new(
            EntryKind::Init { account },
            amount,
            system_actor,
            Some(INITIAL_BALANCE_SUMMARY.to_string()),
        )
    }

    /// Override the timestamp (historical imports)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether the entry touches the given payment method at all
    pub fn involves(&self, account: PaymentMethodId) -> bool {
        self.kind.source() == account || self.kind.destination() == Some(account)
    }

    /// The effect this entry has on `account`, if it touches it
    pub fn effect_on(&self, account: PaymentMethodId) -> Option<Effect> {
        match self.kind {
            EntryKind::Income { account: a } if a == account => Some(Effect::Income),
            EntryKind::Expense { account: a } if a == account => Some(Effect::Expense),
            EntryKind::Init { account: a } if a == account => Some(Effect::Init),
            EntryKind::Transfer { source, .. } if source == account => Some(Effect::TransferOut),
            EntryKind::Transfer { destination, .. } if destination == account => {
                Some(Effect::TransferIn)
            }
            _ => None,
        }
    }

    /// Every (payment method, effect) pair this entry applies
    pub fn effects(&self) -> Vec<(PaymentMethodId, Effect)> {
        match self.kind {
            EntryKind::Income { account } => vec![(account, Effect::Income)],
            EntryKind::Expense { account } => vec![(account, Effect::Expense)],
            EntryKind::Init { account } => vec![(account, Effect::Init)],
            EntryKind::Transfer {
                source,
                destination,
            } => vec![
                (source, Effect::TransferOut),
                (destination, Effect::TransferIn),
            ],
        }
    }

    /// Validate the construction rules of the entry's kind
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if !matches!(self.kind, EntryKind::Init { .. }) && !self.amount.is_positive() {
            return Err(EntryValidationError::NonPositiveAmount(self.amount));
        }

        if let EntryKind::Transfer {
            source,
            destination,
        } = self.kind
        {
            if source == destination {
                return Err(EntryValidationError::SameAccount(source));
            }
        }

        Ok(())
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.kind.name(),
            self.amount
        )?;
        if let Some(summary) = &self.summary {
            write!(f, " {}", summary)?;
        }
        Ok(())
    }
}

/// Validation errors for ledger entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    NonPositiveAmount(Money),
    SameAccount(PaymentMethodId),
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::SameAccount(id) => write!(f, "Transfer source and destination are both {}", id),
        }
    }
}

impl std::error::Error for EntryValidationError {}
