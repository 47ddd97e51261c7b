//! tally - a personal finance ledger with cached per-account balances
//!
//! Every movement of money is an append-only [`models::LedgerEntry`]. Each
//! payment method also carries a cached [`models::AccountBalance`] that is
//! updated in the same write as the entry, and reconciliation can rebuild it
//! from history at any time.
//!
//! # Architecture
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Money, identifiers, payment methods, actors, entries, balances
//! - `storage`: JSON file storage, units of work and account locks
//! - `services`: Ledger, balance, reconciliation and registry operations
//! - `audit`: Append-only audit log
//! - `display`: Plain-text formatting for the terminal
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::config::{paths::TallyPaths, settings::Settings};
//! use tally::services::{ActorService, LedgerService, PaymentMethodService};
//! use tally::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let system = ActorService::new(&storage).ensure_system_actor()?;
//! let cash = PaymentMethodService::new(&storage).create("Cash", None, system.id)?;
//! LedgerService::new(&storage).record_income(amount, system.id, cash.id, None)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
