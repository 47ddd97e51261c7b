//! Core data models for tally
//!
//! This module contains the data structures of the ledger domain: payment
//! methods, actors, entries and the cached balance rows.

pub mod actor;
pub mod balance;
pub mod entry;
pub mod ids;
pub mod money;
pub mod payment_method;

pub use actor::{Actor, SYSTEM_ACTOR_NAME};
pub use balance::AccountBalance;
pub use entry::{Effect, EntryKind, LedgerEntry, INITIAL_BALANCE_SUMMARY};
pub use ids::{ActorId, EntryId, PaymentMethodId};
pub use money::{Money, MoneyParseError};
pub use payment_method::PaymentMethod;
