use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splitledger::cli::{handle_expense_command, handle_group_command, handle_user_command};
use splitledger::config::{paths::LedgerPaths, settings::Settings};
use splitledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "splitledger",
    author = "Kaylee Beyene",
    version,
    about = "Shared-expense ledger for groups",
    long_about = "SplitLedger records who paid what within a group, splits each \
                  expense equally or by percentage, and tells everyone who \
                  should pay whom to settle up."
)]
struct Cli {
    /// Base directory for data, settings and the audit log
    #[arg(long, global = true, env = "SPLITLEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init,

    /// Show current configuration and paths
    Config,

    /// User management commands
    #[command(subcommand)]
    User(splitledger::cli::UserCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(splitledger::cli::GroupCommands),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(splitledger::cli::ExpenseCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => LedgerPaths::with_base_dir(dir),
        None => LedgerPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    init_tracing(&settings.log_filter);

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing SplitLedger at: {}", paths.base_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  splitledger user create <name>");
            println!("  splitledger group create <name> --member <user> --member <user>");
            println!("  splitledger expense add <group> --payer <user> --amount <amount> --description <text>");
        }
        Some(Commands::Config) => {
            println!("SplitLedger Configuration");
            println!("=========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Initialized:      {}", if paths.is_initialized() { "yes" } else { "no" });
            println!();
            println!("Settings:");
            println!("  Schema version:  {}", settings.schema_version);
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Log filter:      {}", settings.log_filter);
        }
        Some(Commands::User(cmd)) => {
            handle_user_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Group(cmd)) => {
            handle_group_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries found.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        None => {
            println!("SplitLedger - shared expenses and settle-up plans");
            println!();
            println!("Run 'splitledger --help' for usage information.");
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the configured filter
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
