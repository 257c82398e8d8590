//! Group repository for JSON storage
//!
//! Manages loading and saving groups (with their memberships) to groups.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Group, GroupId, UserId};

use super::file_io::{read_json, update_json};
use super::lock_error;

/// Serializable group data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GroupData {
    groups: Vec<Group>,
}

/// Repository for group persistence with a membership index
pub struct GroupRepository {
    path: PathBuf,
    data: RwLock<HashMap<GroupId, Group>>,
    /// Index: user_id -> group_ids
    by_member: RwLock<HashMap<UserId, Vec<GroupId>>>,
}

impl GroupRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_member: RwLock::new(HashMap::new()),
        }
    }

    /// Load groups from disk and build the membership index
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: GroupData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_member = self.by_member.write().map_err(lock_error)?;
        swap_in(&mut data, &mut by_member, file_data);

        Ok(())
    }

    /// Make sure groups.json exists and pick up groups other writers added
    pub fn save(&self) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_member = self.by_member.write().map_err(lock_error)?;

        let file_data: GroupData = update_json(&self.path, |_| Ok(()))?;
        swap_in(&mut data, &mut by_member, file_data);

        Ok(())
    }

    /// Get a group by ID
    pub fn get(&self, id: GroupId) -> LedgerResult<Option<Group>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all groups, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<Group>> {
        let data = self.data.read().map_err(lock_error)?;

        let mut groups: Vec<_> = data.values().cloned().collect();
        groups.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(groups)
    }

    /// Get a group by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<Group>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.values().find(|g| g.matches_name(name)).cloned())
    }

    /// Get every group a user belongs to, sorted by name
    pub fn get_by_member(&self, user_id: UserId) -> LedgerResult<Vec<Group>> {
        let data = self.data.read().map_err(lock_error)?;
        let by_member = self.by_member.read().map_err(lock_error)?;

        let ids = by_member.get(&user_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut groups: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        groups.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(groups)
    }

    /// Insert a new group and persist it
    ///
    /// Names are checked against the file contents under the file lock.
    pub fn insert(&self, group: Group) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_member = self.by_member.write().map_err(lock_error)?;

        let file_data: GroupData = update_json(&self.path, |file: &mut GroupData| {
            if file.groups.iter().any(|g| g.matches_name(&group.name)) {
                return Err(LedgerError::Duplicate {
                    entity_type: "Group",
                    identifier: group.name,
                });
            }
            file.groups.push(group);
            Ok(())
        })?;
        swap_in(&mut data, &mut by_member, file_data);

        Ok(())
    }

    /// Count groups
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

fn swap_in(
    data: &mut HashMap<GroupId, Group>,
    by_member: &mut HashMap<UserId, Vec<GroupId>>,
    file_data: GroupData,
) {
    data.clear();
    by_member.clear();

    for group in file_data.groups {
        for member in &group.member_ids {
            by_member.entry(*member).or_default().push(group.id);
        }
        data.insert(group.id, group);
    }
}
