//! Group CLI commands
//!
//! Implements CLI commands for group management and group balances.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_group_balances, format_group_list, format_group_summary};
use crate::error::LedgerResult;
use crate::services::{GroupService, LedgerService, UserService};
use crate::storage::Storage;

/// Group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        /// Group name
        name: String,
        /// Member name or ID (repeat for each member)
        #[arg(short, long = "member", required = true)]
        members: Vec<String>,
    },
    /// List all groups
    List,
    /// Show group details
    Show {
        /// Group name or ID
        group: String,
    },
    /// Show member balances and the payments that settle the group
    Balances {
        /// Group name or ID
        group: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a group command
pub fn handle_group_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GroupCommands,
) -> LedgerResult<()> {
    let service = GroupService::new(storage);

    match cmd {
        GroupCommands::Create { name, members } => {
            let user_service = UserService::new(storage);
            let member_ids = members
                .iter()
                .map(|m| user_service.resolve(m).map(|u| u.id))
                .collect::<LedgerResult<Vec<_>>>()?;

            let group = service.create(&name, &member_ids)?;
            println!(
                "Created group: {} ({} members)",
                group.name,
                group.member_ids.len()
            );
            println!("  ID: {}", group.id);
        }

        GroupCommands::List => {
            println!("{}", format_group_list(&service.list()?).trim_end());
        }

        GroupCommands::Show { group } => {
            let group = service.resolve(&group)?;
            let summary = service.summary(group.id)?;
            print!("{}", format_group_summary(&summary, &settings.currency_symbol));
        }

        GroupCommands::Balances { group, json } => {
            let group = service.resolve(&group)?;
            let result = LedgerService::new(storage).get_group_balances(group.id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", format_group_balances(&result, &settings.currency_symbol));
            }
        }
    }

    Ok(())
}
