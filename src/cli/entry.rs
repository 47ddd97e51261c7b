//! Entry CLI commands: income, expense, transfer, listing and deletion

use clap::Args;

use crate::config::settings::Settings;
use crate::display::{format_entry_details, format_entry_register, NameLookup};
use crate::error::{TallyError, TallyResult};
use crate::models::PaymentMethodId;
use crate::services::{ActorService, BalanceService, LedgerService, PaymentMethodService};
use crate::storage::Storage;

use super::{parse_amount, resolve_actor};

/// Arguments shared by income and expense
#[derive(Args)]
pub struct RecordArgs {
    /// Payment method name or ID
    pub method: String,
    /// Amount (e.g., "30000" or "1500.50")
    pub amount: String,
    /// Who recorded it (required unless TALLY_ACTOR is set)
    #[arg(short, long, env = "TALLY_ACTOR")]
    pub actor: Option<String>,
    /// Free-text note
    #[arg(short, long)]
    pub summary: Option<String>,
}

#[derive(Args)]
pub struct ExpenseArgs {
    #[command(flatten)]
    pub record: RecordArgs,
    /// Record the expense even if it exceeds the cached balance
    #[arg(long)]
    pub allow_overdraft: bool,
}

#[derive(Args)]
pub struct TransferArgs {
    /// Source payment method
    pub from: String,
    /// Destination payment method
    pub to: String,
    /// Amount to move
    pub amount: String,
    /// Who recorded it (required unless TALLY_ACTOR is set)
    #[arg(short, long, env = "TALLY_ACTOR")]
    pub actor: Option<String>,
    #[arg(short, long)]
    pub summary: Option<String>,
}

#[derive(Args)]
pub struct EntriesArgs {
    /// Only entries touching this payment method
    #[arg(short, long)]
    pub method: Option<String>,
    /// Number of entries to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

pub fn handle_income(
    storage: &Storage,
    settings: &Settings,
    args: RecordArgs,
) -> TallyResult<()> {
    let method = PaymentMethodService::new(storage).resolve(&args.method)?;
    let amount = parse_amount(&args.amount)?;
    let actor = resolve_actor(storage, args.actor.as_deref())?;

    let entry =
        LedgerService::new(storage).record_income(amount, actor.id, method.id, args.summary)?;

    println!(
        "Recorded income of {} to {}",
        settings.format_money(entry.amount),
        method.name
    );
    print_balance(storage, settings, &method.name, method.id)
}

/// Record an expense, refusing to overdraw unless asked to
pub fn handle_expense(
    storage: &Storage,
    settings: &Settings,
    args: ExpenseArgs,
) -> TallyResult<()> {
    let ExpenseArgs {
        record,
        allow_overdraft,
    } = args;

    let method = PaymentMethodService::new(storage).resolve(&record.method)?;
    let amount = parse_amount(&record.amount)?;
    let actor = resolve_actor(storage, record.actor.as_deref())?;

    if !allow_overdraft {
        let available = BalanceService::new(storage).current(method.id)?;
        if available < amount {
            return Err(TallyError::InsufficientFunds {
                method: method.name,
                needed: amount,
                available,
            });
        }
    }

    let entry =
        LedgerService::new(storage).record_expense(amount, actor.id, method.id, record.summary)?;

    println!(
        "Recorded expense of {} from {}",
        settings.format_money(entry.amount),
        method.name
    );
    print_balance(storage, settings, &method.name, method.id)
}

pub fn handle_transfer(
    storage: &Storage,
    settings: &Settings,
    args: TransferArgs,
) -> TallyResult<()> {
    let methods = PaymentMethodService::new(storage);
    let from = methods.resolve(&args.from)?;
    let to = methods.resolve(&args.to)?;
    let amount = parse_amount(&args.amount)?;
    let actor = resolve_actor(storage, args.actor.as_deref())?;

    LedgerService::new(storage).record_transfer(amount, actor.id, from.id, to.id, args.summary)?;

    println!(
        "Transferred {} from {} to {}",
        settings.format_money(amount),
        from.name,
        to.name
    );
    print_balance(storage, settings, &from.name, from.id)?;
    print_balance(storage, settings, &to.name, to.id)
}

pub fn handle_entries_command(
    storage: &Storage,
    settings: &Settings,
    args: EntriesArgs,
) -> TallyResult<()> {
    let account = match args.method.as_deref() {
        Some(name) => Some(PaymentMethodService::new(storage).resolve(name)?.id),
        None => None,
    };

    let entries = LedgerService::new(storage).list_entries(account, Some(args.limit))?;
    print!(
        "{}",
        format_entry_register(&entries, &name_lookup(storage)?, settings)
    );
    Ok(())
}

/// Remove an entry; its balance effect stays until the method is reconciled
pub fn handle_delete_entry(storage: &Storage, settings: &Settings, id: &str) -> TallyResult<()> {
    let ledger = LedgerService::new(storage);
    let entry = ledger
        .find_entry(id)?
        .ok_or_else(|| TallyError::entry_not_found(id))?;

    let deleted = ledger.delete_entry(entry.id)?;

    println!("Deleted entry:");
    print!(
        "{}",
        format_entry_details(&deleted, &name_lookup(storage)?, settings)
    );
    println!();
    println!("Cached balances were not changed. Run 'tally reconcile --all' to recompute them.");
    Ok(())
}

fn name_lookup(storage: &Storage) -> TallyResult<NameLookup> {
    let methods = PaymentMethodService::new(storage).list(true)?;
    let actors = ActorService::new(storage).list()?;
    Ok(NameLookup::new(&methods, &actors))
}

fn print_balance(
    storage: &Storage,
    settings: &Settings,
    name: &str,
    id: PaymentMethodId,
) -> TallyResult<()> {
    let balance = BalanceService::new(storage).current(id)?;
    println!("  {} balance: {}", name, settings.format_money(balance));
    Ok(())
}
