//! Display formatting for terminal output
//!
//! Provides utilities for formatting users, groups, expenses and balances as
//! plain-text tables.

pub mod balance;
pub mod expense;
pub mod group;
pub mod user;

pub use balance::{format_group_balances, format_user_balances};
pub use expense::format_expense_list;
pub use group::{format_group_list, format_group_summary};
pub use user::format_user_list;
