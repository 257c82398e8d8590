//! Service layer for SplitLedger
//!
//! The service layer provides business logic on top of the storage layer:
//! splitting expenses, aggregating balances, planning settlements, and
//! managing users and groups.

pub mod balance;
pub mod group;
pub mod ledger;
pub mod settlement;
pub mod split;
pub mod user;

pub use group::{GroupService, GroupSummary};
pub use ledger::{GroupBalances, LedgerService, RecordExpenseInput, UserBalances};
pub use split::{compute_splits, ParticipantInput};
pub use user::UserService;
