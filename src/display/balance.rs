//! Balance display formatting
//!
//! Formats group balances, settlement plans and per-user balances.

use crate::models::Money;
use crate::services::{GroupBalances, UserBalances};

/// Format a group's balances followed by the settlement plan
pub fn format_group_balances(result: &GroupBalances, currency_symbol: &str) -> String {
    let fmt_money = |m: Money| m.format_with_symbol(currency_symbol);

    let name_width = result
        .balances
        .iter()
        .map(|b| b.name.len())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    output.push_str(&format!("Balances for {}\n\n", result.group.name));
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:>12}  {:>12}\n",
        "Member",
        "Paid",
        "Owes",
        "Net",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:->12}  {:->12}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for balance in &result.balances {
        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:>12}  {:>12}\n",
            balance.name,
            fmt_money(balance.total_paid),
            fmt_money(balance.total_owed),
            fmt_money(balance.net_balance),
            name_width = name_width,
        ));
    }

    output.push('\n');
    if result.settlements.is_empty() {
        output.push_str("All settled up.\n");
    } else {
        output.push_str("Settlements:\n");
        for s in &result.settlements {
            output.push_str(&format!(
                "  {} pays {} {}\n",
                s.from_name,
                s.to_name,
                fmt_money(s.amount)
            ));
        }
    }

    output
}

/// Format a user's net balance in each of their groups
pub fn format_user_balances(result: &UserBalances, currency_symbol: &str) -> String {
    if result.balances.is_empty() {
        return format!("{} is not a member of any group.", result.user.name);
    }

    let name_width = result
        .balances
        .iter()
        .map(|b| b.group_name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!("Balances for {}\n\n", result.user.name));
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {}\n",
        "Group",
        "Net",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:-<10}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for balance in &result.balances {
        let status = if balance.net_balance.is_positive() {
            "is owed"
        } else if balance.net_balance.is_negative() {
            "owes"
        } else {
            "settled"
        };

        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {}\n",
            balance.group_name,
            balance.net_balance.format_with_symbol(currency_symbol),
            status,
            name_width = name_width,
        ));
    }

    output
}
