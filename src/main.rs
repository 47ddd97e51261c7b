use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tally::cli::{
    handle_actor_command, handle_audit_command, handle_balance_command, handle_delete_entry,
    handle_entries_command, handle_expense, handle_income, handle_method_command,
    handle_reconcile_command, handle_transfer, ActorCommands, EntriesArgs, ExpenseArgs,
    MethodCommands, ReconcileArgs, RecordArgs, TransferArgs,
};
use tally::config::{paths::TallyPaths, settings::Settings};
use tally::models::Actor;
use tally::services::ActorService;
use tally::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Personal finance ledger with per-account balances",
    long_about = "tally records income, expenses and transfers between your payment \
                  methods, keeps a running balance for each of them and can rebuild \
                  those balances from history to catch drift."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show configuration and paths
    Config,

    /// Payment method management commands
    #[command(subcommand)]
    Method(MethodCommands),

    /// Actor management commands
    #[command(subcommand)]
    Actor(ActorCommands),

    /// Record money received into a payment method
    Income(RecordArgs),

    /// Record money spent from a payment method
    Expense(ExpenseArgs),

    /// Move money between two payment methods
    Transfer(TransferArgs),

    /// List ledger entries, newest first
    #[command(alias = "log")]
    Entries(EntriesArgs),

    /// Delete a ledger entry by ID
    DeleteEntry {
        /// Entry ID (full or short form)
        id: String,
    },

    /// Show cached balances
    Balance {
        /// Include retired payment methods
        #[arg(short, long)]
        all: bool,
    },

    /// Rebuild cached balances from the ledger
    Reconcile(ReconcileArgs),

    /// Show recent audit log records
    Audit {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_level.clone());

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = TallyPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let Some(command) = cli.command else {
        println!("tally - personal finance ledger");
        println!();
        println!("Run 'tally --help' for usage information.");
        return Ok(());
    };

    match command {
        Commands::Init => {
            println!("Initializing tally at: {}", paths.base_dir().display());
            let system = initialize_storage(&paths)?;
            settings.setup_completed = true;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!("  System actor: {}", system.id);
            println!();
            println!("Run 'tally method create <name> --initial <amount>' to add a payment method.");
        }
        Commands::Config => {
            println!("tally Configuration");
            println!("===================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!("  Log level:       {}", settings.log_level);
            println!("  Initialized:     {}", settings.setup_completed);
        }
        command => {
            let system = ActorService::new(&storage).ensure_system_actor()?;
            run(command, &storage, &settings, &system)?;
        }
    }

    Ok(())
}

fn run(
    command: Commands,
    storage: &Storage,
    settings: &Settings,
    system: &Actor,
) -> tally::TallyResult<()> {
    match command {
        Commands::Method(cmd) => handle_method_command(storage, system, cmd),
        Commands::Actor(cmd) => handle_actor_command(storage, cmd),
        Commands::Income(args) => handle_income(storage, settings, args),
        Commands::Expense(args) => handle_expense(storage, settings, args),
        Commands::Transfer(args) => handle_transfer(storage, settings, args),
        Commands::Entries(args) => handle_entries_command(storage, settings, args),
        Commands::DeleteEntry { id } => handle_delete_entry(storage, settings, &id),
        Commands::Balance { all } => handle_balance_command(storage, settings, all),
        Commands::Reconcile(args) => handle_reconcile_command(storage, settings, args),
        Commands::Audit { limit } => handle_audit_command(storage, limit),
        Commands::Init | Commands::Config => Ok(()),
    }
}
