//! Group service
//!
//! Provides business logic for creating groups, looking them up and
//! summarizing their spending.

use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Expense, Group, GroupId, Money, User, UserId};
use crate::storage::{LedgerStore, Storage};

use super::balance;

/// A group with its members and total spending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: Group,
    pub members: Vec<User>,
    pub expense_count: usize,
    pub total_expenses: Money,
}

/// Service for group management
pub struct GroupService<'a> {
    storage: &'a Storage,
}

impl<'a> GroupService<'a> {
    /// Create a new group service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new group from existing users
    pub fn create(&self, name: &str, member_ids: &[UserId]) -> LedgerResult<Group> {
        for &id in member_ids {
            if self.storage.users.get(id)?.is_none() {
                return Err(LedgerError::user_not_found(id.to_string()));
            }
        }

        let group = Group::new(name.trim(), member_ids.iter().copied());
        group
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.groups.insert(group.clone())?;

        self.storage.log_create(
            EntityType::Group,
            group.id.to_string(),
            Some(group.name.clone()),
            &group,
        );
        tracing::info!(
            group = %group.id,
            name = %group.name,
            members = group.member_ids.len(),
            "created group"
        );

        Ok(group)
    }

    /// Get a group by ID
    pub fn get(&self, id: GroupId) -> LedgerResult<Option<Group>> {
        self.storage.groups.get(id)
    }

    /// All groups sorted by name
    pub fn list(&self) -> LedgerResult<Vec<Group>> {
        self.storage.groups.get_all()
    }

    /// Find a group by ID, short ID or name
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Group>> {
        let identifier = identifier.trim();

        if let Ok(id) = identifier.parse::<GroupId>() {
            if let Some(group) = self.storage.groups.get(id)? {
                return Ok(Some(group));
            }
        }

        if let Some(group) = self.storage.groups.get_by_name(identifier)? {
            return Ok(Some(group));
        }

        Ok(self
            .storage
            .groups
            .get_all()?
            .into_iter()
            .find(|g| g.id.to_string() == identifier))
    }

    /// Find a group or fail with `NotFound`
    pub fn resolve(&self, identifier: &str) -> LedgerResult<Group> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::group_not_found(identifier))
    }

    /// The group with its members and spending totals
    pub fn summary(&self, id: GroupId) -> LedgerResult<GroupSummary> {
        let group = self
            .storage
            .groups
            .get(id)?
            .ok_or_else(|| LedgerError::group_not_found(id.to_string()))?;

        let members = self.storage.get_members(&group)?;
        let expenses = self.storage.list_expenses_with_splits(group.id)?;

        Ok(GroupSummary {
            expense_count: expenses.len(),
            total_expenses: balance::total_spent(&expenses),
            group,
            members,
        })
    }

    /// The group's expenses with their splits, newest first
    pub fn expenses(&self, id: GroupId) -> LedgerResult<Vec<Expense>> {
        if self.storage.groups.get(id)?.is_none() {
            return Err(LedgerError::group_not_found(id.to_string()));
        }

        let mut expenses = self.storage.list_expenses_with_splits(id)?;
        expenses.reverse();
        Ok(expenses)
    }
}
