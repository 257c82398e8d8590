//! Expense CLI commands
//!
//! Implements CLI commands for recording and listing expenses.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_expense_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, SplitPolicy};
use crate::services::{GroupService, LedgerService, ParticipantInput, RecordExpenseInput, UserService};
use crate::storage::{LedgerStore, Storage};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense paid by one member
    Add {
        /// Group name or ID
        group: String,
        /// Payer name or ID
        #[arg(short, long)]
        payer: String,
        /// Amount (e.g., "90", "12.50")
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,
        /// What the money was spent on
        #[arg(short, long)]
        description: String,
        /// Split policy: equal or percentage
        #[arg(short, long, default_value = "equal")]
        split: String,
        /// Participant share as <user>=<percent>, or just <user> for equal splits
        #[arg(long = "share")]
        shares: Vec<String>,
    },
    /// List a group's expenses, newest first
    List {
        /// Group name or ID
        group: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> LedgerResult<()> {
    let group_service = GroupService::new(storage);
    let user_service = UserService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            group,
            payer,
            amount,
            description,
            split,
            shares,
        } => {
            let group = group_service.resolve(&group)?;
            let payer = user_service.resolve(&payer)?;

            let amount = Money::parse(&amount)
                .map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))?;

            let policy = SplitPolicy::parse(&split).ok_or_else(|| {
                LedgerError::Validation(format!(
                    "Unknown split policy '{}' (expected equal or percentage)",
                    split
                ))
            })?;

            let participants = if shares.is_empty() {
                if policy == SplitPolicy::Percentage {
                    return Err(LedgerError::Validation(
                        "Percentage split requires --share <user>=<percent> for every member"
                            .into(),
                    ));
                }
                group
                    .member_ids
                    .iter()
                    .copied()
                    .map(ParticipantInput::new)
                    .collect()
            } else {
                shares
                    .iter()
                    .map(|s| parse_share(&user_service, s))
                    .collect::<LedgerResult<Vec<_>>>()?
            };

            let expense = LedgerService::new(storage).record_expense(RecordExpenseInput {
                group_id: group.id,
                payer_id: payer.id,
                amount,
                description,
                policy,
                participants,
            })?;

            println!(
                "Recorded expense: {} {} paid by {} in {}",
                expense.description,
                expense.amount.format_with_symbol(&settings.currency_symbol),
                payer.name,
                group.name
            );
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List { group } => {
            let group = group_service.resolve(&group)?;
            let expenses = group_service.expenses(group.id)?;
            let members = storage.get_members(&group)?;

            println!(
                "{}",
                format_expense_list(&expenses, &members, &settings.currency_symbol).trim_end()
            );
        }
    }

    Ok(())
}

/// Parse a `<user>=<percent>` or `<user>` share argument
fn parse_share(users: &UserService<'_>, arg: &str) -> LedgerResult<ParticipantInput> {
    let (who, percentage) = match arg.rsplit_once('=') {
        Some((who, pct)) => {
            let pct: f64 = pct.trim().trim_end_matches('%').parse().map_err(|_| {
                LedgerError::Validation(format!("Invalid percentage in share '{}'", arg))
            })?;
            (who, Some(pct))
        }
        None => (arg, None),
    };

    let user = users.resolve(who)?;
    Ok(ParticipantInput {
        user_id: user.id,
        percentage,
    })
}
