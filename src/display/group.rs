//! Group display formatting
//!
//! Formats groups for terminal output in table and detail views.

use crate::models::Group;
use crate::services::GroupSummary;

/// Format a list of groups as a table
pub fn format_group_list(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups found.".to_string();
    }

    let name_width = groups
        .iter()
        .map(|g| g.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<12}  {:>7}\n",
        "Name",
        "ID",
        "Members",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<12}  {:->7}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for group in groups {
        output.push_str(&format!(
            "{:<name_width$}  {:<12}  {:>7}\n",
            group.name,
            group.id.to_string(),
            group.member_ids.len(),
            name_width = name_width,
        ));
    }

    output
}

/// Format a group's details with members and spending
pub fn format_group_summary(summary: &GroupSummary, currency_symbol: &str) -> String {
    let group = &summary.group;

    let mut output = String::new();
    output.push_str(&format!("Group: {}\n", group.name));
    output.push_str(&format!("  ID:       {}\n", group.id));
    output.push_str(&format!(
        "  Created:  {}\n",
        group.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push('\n');
    output.push_str(&format!("  Expenses: {}\n", summary.expense_count));
    output.push_str(&format!(
        "  Total:    {}\n",
        summary.total_expenses.format_with_symbol(currency_symbol)
    ));
    output.push('\n');
    output.push_str(&format!("  Members ({}):\n", summary.members.len()));
    for member in &summary.members {
        output.push_str(&format!("    {} ({})\n", member.name, member.id));
    }

    output
}
