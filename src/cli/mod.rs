//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Handlers resolve
//! names to records, call one service operation and print the result.

pub mod actor;
pub mod audit;
pub mod balance;
pub mod entry;
pub mod method;
pub mod reconcile;

pub use actor::{handle_actor_command, ActorCommands};
pub use audit::handle_audit_command;
pub use balance::handle_balance_command;
pub use entry::{
    handle_delete_entry, handle_entries_command, handle_expense, handle_income, handle_transfer,
    EntriesArgs, ExpenseArgs, RecordArgs, TransferArgs,
};
pub use method::{handle_method_command, MethodCommands};
pub use reconcile::{handle_reconcile_command, ReconcileArgs};

use crate::error::{TallyError, TallyResult};
use crate::models::{Actor, Money};
use crate::services::ActorService;
use crate::storage::Storage;

/// Parse a user-supplied amount such as "1500", "1500.50" or "Rp1,500"
pub(crate) fn parse_amount(input: &str) -> TallyResult<Money> {
    Money::parse(input).map_err(|e| {
        TallyError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '1500' or '1500.50'",
            input, e
        ))
    })
}

/// The actor named on the command line (or via `TALLY_ACTOR`)
///
/// Entries other than opening balances must name who recorded them.
pub(crate) fn resolve_actor(storage: &Storage, actor: Option<&str>) -> TallyResult<Actor> {
    match actor {
        Some(name) => ActorService::new(storage).resolve(name),
        None => Err(TallyError::Validation(
            "An actor is required; pass --actor or set TALLY_ACTOR".into(),
        )),
    }
}
