//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses (each carrying its splits) to
//! expenses.json. Rows are kept in insertion order, which is the order
//! balance queries see them in.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerResult;
use crate::models::{Expense, GroupId};

use super::file_io::{read_json, update_json};
use super::lock_error;

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

#[derive(Debug, Default)]
struct ExpenseTable {
    rows: Vec<Expense>,
    /// Index: group_id -> row positions, in insertion order
    by_group: HashMap<GroupId, Vec<usize>>,
}

impl From<ExpenseData> for ExpenseTable {
    fn from(data: ExpenseData) -> Self {
        let mut by_group: HashMap<GroupId, Vec<usize>> = HashMap::new();
        for (pos, expense) in data.expenses.iter().enumerate() {
            by_group.entry(expense.group_id).or_default().push(pos);
        }
        Self {
            rows: data.expenses,
            by_group,
        }
    }
}

/// Repository for expense persistence with a per-group index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<ExpenseTable>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(ExpenseTable::default()),
        }
    }

    /// Load expenses from disk and build the group index
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;
        *self.data.write().map_err(lock_error)? = file_data.into();
        Ok(())
    }

    /// Make sure expenses.json exists and pick up rows other writers added
    pub fn save(&self) -> LedgerResult<()> {
        let mut table = self.data.write().map_err(lock_error)?;
        let file_data: ExpenseData = update_json(&self.path, |_| Ok(()))?;
        *table = file_data.into();
        Ok(())
    }

    /// Get all expenses of a group, with their splits, in insertion order
    pub fn get_by_group(&self, group_id: GroupId) -> LedgerResult<Vec<Expense>> {
        let table = self.data.read().map_err(lock_error)?;

        let positions = table
            .by_group
            .get(&group_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        Ok(positions
            .iter()
            .filter_map(|&pos| table.rows.get(pos).cloned())
            .collect())
    }

    /// Append an expense and persist it as one unit
    ///
    /// The append lands on the current file contents, so rows written by
    /// another `ExpenseRepository` on the same file since `load` are kept and
    /// become visible here. Memory is only replaced after the file write
    /// succeeds.
    pub fn append(&self, expense: Expense) -> LedgerResult<()> {
        let mut table = self.data.write().map_err(lock_error)?;

        let file_data: ExpenseData = update_json(&self.path, |data: &mut ExpenseData| {
            data.expenses.push(expense);
            Ok(())
        })?;
        *table = file_data.into();

        Ok(())
    }

    /// Count expenses
    pub fn count(&self) -> LedgerResult<usize> {
        let table = self.data.read().map_err(lock_error)?;
        Ok(table.rows.len())
    }
}
