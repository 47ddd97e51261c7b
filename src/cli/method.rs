//! Payment method CLI commands

use clap::Subcommand;

use crate::display::format_method_list;
use crate::error::TallyResult;
use crate::models::Actor;
use crate::services::{PaymentMethodService, PaymentMethodUpdate};
use crate::storage::Storage;

use super::parse_amount;

/// Payment method subcommands
#[derive(Subcommand)]
pub enum MethodCommands {
    /// Create a payment method
    Create {
        /// Name, e.g. "Cash" or "BCA"
        name: String,
        /// Opening balance (e.g., "100000" or "1500.50")
        #[arg(short, long)]
        initial: Option<String>,
    },
    /// List payment methods
    List {
        /// Include retired methods
        #[arg(short, long)]
        all: bool,
    },
    /// Rename a payment method
    Rename {
        /// Payment method name or ID
        method: String,
        /// New name
        name: String,
    },
    /// Reset the balance with an initial-balance entry
    SetInitial {
        /// Payment method name or ID
        method: String,
        /// New opening balance
        amount: String,
    },
    /// Retire a payment method, keeping its history
    Retire {
        /// Payment method name or ID
        method: String,
    },
    /// Bring a retired payment method back
    Restore {
        /// Payment method name or ID
        method: String,
    },
}

/// Handle a payment method command
pub fn handle_method_command(
    storage: &Storage,
    system: &Actor,
    cmd: MethodCommands,
) -> TallyResult<()> {
    let service = PaymentMethodService::new(storage);

    match cmd {
        MethodCommands::Create { name, initial } => {
            let initial = initial.as_deref().map(parse_amount).transpose()?;
            let method = service.create(&name, initial, system.id)?;

            println!("Created payment method: {}", method.name);
            if let Some(amount) = initial {
                println!("  Initial balance: {}", amount);
            }
            println!("  ID: {}", method.id);
        }

        MethodCommands::List { all } => {
            let methods = service.list(all)?;
            print!("{}", format_method_list(&methods));
        }

        MethodCommands::Rename { method, name } => {
            let found = service.resolve(&method)?;
            let renamed = service.apply(found.id, PaymentMethodUpdate::Rename(name), system.id)?;
            println!("Renamed payment method: {} -> {}", found.name, renamed.name);
        }

        MethodCommands::SetInitial { method, amount } => {
            let found = service.resolve(&method)?;
            let amount = parse_amount(&amount)?;
            service.apply(
                found.id,
                PaymentMethodUpdate::SetInitialBalance(amount),
                system.id,
            )?;
            println!("Set initial balance of {} to {}", found.name, amount);
        }

        MethodCommands::Retire { method } => {
            let found = service.resolve(&method)?;
            let retired = service.retire(found.id)?;
            println!("Retired payment method: {}", retired.name);
        }

        MethodCommands::Restore { method } => {
            let found = service.resolve(&method)?;
            let restored = service.restore(found.id)?;
            println!("Restored payment method: {}", restored.name);
        }
    }

    Ok(())
}
