//! SplitLedger - shared-expense ledger for groups
//!
//! This library records expenses paid by one member of a group, splits them
//! among the members, and derives each member's balance together with a short
//! list of payments that settles the group.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (users, groups, expenses, money, balances)
//! - `storage`: JSON file storage layer and the `LedgerStore` trait
//! - `services`: Split calculation, balance aggregation, settlement planning
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use splitledger::config::paths::LedgerPaths;
//! use splitledger::services::LedgerService;
//! use splitledger::storage::Storage;
//!
//! let mut storage = Storage::new(LedgerPaths::new()?)?;
//! storage.load_all()?;
//! let balances = LedgerService::new(&storage).get_group_balances(group_id)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
