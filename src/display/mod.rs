//! Display formatting for terminal output
//!
//! Plain-text tables for payment methods, entries and reconciliation results.

pub mod entry;
pub mod method;
pub mod reconcile;

pub use entry::{format_entry_details, format_entry_register, NameLookup};
pub use method::{format_balance_list, format_method_list};
pub use reconcile::{format_reconcile_all, format_reconciliation_report};
