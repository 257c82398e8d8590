//! User display formatting

use crate::models::User;

/// Format a list of users as a table
pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let name_width = users
        .iter()
        .map(|u| u.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<12}  {}\n",
        "Name",
        "ID",
        "Created",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<12}  {:-<16}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for user in users {
        output.push_str(&format!(
            "{:<name_width$}  {:<12}  {}\n",
            user.name,
            user.id.to_string(),
            user.created_at.format("%Y-%m-%d %H:%M"),
            name_width = name_width,
        ));
    }

    output.push_str(&format!("\nTotal: {} users\n", users.len()));
    output
}
