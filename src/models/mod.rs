//! Core data models for SplitLedger
//!
//! This module contains all the data structures that represent the
//! shared-expense domain: users, groups, expenses with their splits, and the
//! derived balance and settlement views.

pub mod balance;
pub mod expense;
pub mod group;
pub mod ids;
pub mod money;
pub mod user;

pub use balance::{Balance, GroupBalance, Settlement};
pub use expense::{Expense, Split, SplitPolicy, MAX_EXPENSE_AMOUNT};
pub use group::Group;
pub use ids::{ExpenseId, GroupId, UserId};
pub use money::Money;
pub use user::User;
