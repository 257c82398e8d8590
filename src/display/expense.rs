//! Expense display formatting
//!
//! Formats a group's expenses for terminal output, one row per expense with
//! the per-member shares underneath.

use std::collections::HashMap;

use crate::models::{Expense, User, UserId};

/// Format a list of expenses with their splits
///
/// `users` supplies display names; unknown IDs fall back to the short ID.
pub fn format_expense_list(expenses: &[Expense], users: &[User], currency_symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let names: HashMap<UserId, &str> = users.iter().map(|u| (u.id, u.name.as_str())).collect();
    let name_of = |id: UserId| {
        names
            .get(&id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let desc_width = expenses
        .iter()
        .map(|e| e.description.len())
        .max()
        .unwrap_or(11)
        .clamp(11, 40);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<desc_width$}  {:>12}  {:<16}  {}\n",
        "Date",
        "Description",
        "Amount",
        "Paid by",
        "Split",
        desc_width = desc_width,
    ));
    output.push_str(&format!(
        "{:-<10}  {:-<desc_width$}  {:->12}  {:-<16}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        desc_width = desc_width,
    ));

    for expense in expenses {
        output.push_str(&format!(
            "{:<10}  {:<desc_width$}  {:>12}  {:<16}  {}\n",
            expense.created_at.format("%Y-%m-%d"),
            truncate(&expense.description, desc_width),
            expense.amount.format_with_symbol(currency_symbol),
            truncate(&name_of(expense.payer_id), 16),
            expense.policy,
            desc_width = desc_width,
        ));

        for split in &expense.splits {
            let pct = split
                .percentage
                .map(|p| format!(" ({}%)", p))
                .unwrap_or_default();
            output.push_str(&format!(
                "{:<10}    {} owes {}{}\n",
                "",
                name_of(split.user_id),
                split.share.format_with_symbol(currency_symbol),
                pct,
            ));
        }
    }

    output.push_str(&format!("\nTotal: {} expenses\n", expenses.len()));
    output
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
