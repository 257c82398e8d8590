//! Storage layer for SplitLedger
//!
//! Provides JSON file storage with locked, atomic read-modify-write updates,
//! and the `LedgerStore` trait the ledger engine reads and writes through.
//! Several `Storage` instances, in one process or several, may share a data
//! directory without losing each other's records.

pub mod expenses;
pub mod file_io;
pub mod groups;
pub mod users;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, update_json, write_json_atomic, FileLock};
pub use groups::GroupRepository;
pub use users::UserRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Expense, Group, GroupId, Split, User, UserId};

/// Data access the ledger engine needs
///
/// Every read returns fully materialized values; an expense always comes back
/// with its complete set of splits.
pub trait LedgerStore {
    fn get_user(&self, id: UserId) -> LedgerResult<Option<User>>;

    fn get_group(&self, id: GroupId) -> LedgerResult<Option<Group>>;

    /// All expenses of a group with their splits, in recording order
    fn list_expenses_with_splits(&self, group_id: GroupId) -> LedgerResult<Vec<Expense>>;

    /// Persist an expense together with its splits as one atomic unit
    fn create_expense_with_splits(&self, expense: Expense, splits: Vec<Split>)
        -> LedgerResult<Expense>;

    /// Every group the user belongs to
    fn list_memberships(&self, user_id: UserId) -> LedgerResult<Vec<Group>>;

    /// The users behind a group's member IDs, in member order
    fn get_members(&self, group: &Group) -> LedgerResult<Vec<User>> {
        group
            .member_ids
            .iter()
            .map(|&id| {
                self.get_user(id)?
                    .ok_or_else(|| missing_member(group, id))
            })
            .collect()
    }
}

pub(crate) fn missing_member(group: &Group, user_id: UserId) -> LedgerError {
    LedgerError::InvariantViolation(format!(
        "group {} lists member {} which has no user record",
        group.id, user_id
    ))
}

pub(crate) fn lock_error<E: std::fmt::Display>(e: E) -> LedgerError {
    LedgerError::Store(format!("Failed to acquire lock: {}", e))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub expenses: ExpenseRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            groups: GroupRepository::new(paths.groups_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> LedgerResult<()> {
        self.users.load()?;
        self.groups.load()?;
        self.expenses.load()?;
        Ok(())
    }

    /// Create any missing data files and refresh from disk
    pub fn save_all(&self) -> LedgerResult<()> {
        self.users.save()?;
        self.groups.save()?;
        self.expenses.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Record a creation in the audit log
    ///
    /// The entity is already committed when this runs, so a failing audit
    /// write is reported through tracing instead of failing the operation.
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        if let Err(e) = self.audit.log(&entry) {
            tracing::warn!(error = %e, entity = %entity_type, "failed to write audit entry");
        }
    }
}

impl LedgerStore for Storage {
    fn get_user(&self, id: UserId) -> LedgerResult<Option<User>> {
        self.users.get(id)
    }

    fn get_group(&self, id: GroupId) -> LedgerResult<Option<Group>> {
        self.groups.get(id)
    }

    fn list_expenses_with_splits(&self, group_id: GroupId) -> LedgerResult<Vec<Expense>> {
        self.expenses.get_by_group(group_id)
    }

    fn create_expense_with_splits(
        &self,
        mut expense: Expense,
        splits: Vec<Split>,
    ) -> LedgerResult<Expense> {
        expense.splits = splits;
        expense
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.expenses.append(expense.clone())?;

        self.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.description.clone()),
            &expense,
        );

        Ok(expense)
    }

    fn list_memberships(&self, user_id: UserId) -> LedgerResult<Vec<Group>> {
        self.groups.get_by_member(user_id)
    }

    fn get_members(&self, group: &Group) -> LedgerResult<Vec<User>> {
        self.users
            .get_many(&group.member_ids)?
            .into_iter()
            .zip(&group.member_ids)
            .map(|(user, &id)| user.ok_or_else(|| missing_member(group, id)))
            .collect()
    }
}
