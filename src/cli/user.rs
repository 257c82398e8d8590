//! User CLI commands
//!
//! Implements CLI commands for user management and per-user balances.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_user_balances, format_user_list};
use crate::error::LedgerResult;
use crate::services::{LedgerService, UserService};
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// User name
        name: String,
    },
    /// List all users
    List,
    /// Show a user's net balance in every group
    Balances {
        /// User name or ID
        user: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    settings: &Settings,
    cmd: UserCommands,
) -> LedgerResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Create { name } => {
            let user = service.create(&name)?;
            println!("Created user: {}", user.name);
            println!("  ID: {}", user.id);
        }

        UserCommands::List => {
            println!("{}", format_user_list(&service.list()?).trim_end());
        }

        UserCommands::Balances { user, json } => {
            let user = service.resolve(&user)?;
            let result = LedgerService::new(storage).get_user_balances(user.id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_user_balances(&result, &settings.currency_symbol).trim_end());
            }
        }
    }

    Ok(())
}
