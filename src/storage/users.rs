//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, UserId};

use super::file_io::{read_json, update_json};
use super::lock_error;

/// Serializable user data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
}

impl UserRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: UserData = read_json(&self.path)?;
        *self.data.write().map_err(lock_error)? = index(file_data);
        Ok(())
    }

    /// Make sure users.json exists and pick up users other writers added
    pub fn save(&self) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        let file_data: UserData = update_json(&self.path, |_| Ok(()))?;
        *data = index(file_data);
        Ok(())
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> LedgerResult<Option<User>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// Get several users by ID in one pass, preserving the requested order
    pub fn get_many(&self, ids: &[UserId]) -> LedgerResult<Vec<Option<User>>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(ids.iter().map(|id| data.get(id).cloned()).collect())
    }

    /// Get all users, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<User>> {
        let data = self.data.read().map_err(lock_error)?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(users)
    }

    /// Get a user by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<User>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.values().find(|u| u.matches_name(name)).cloned())
    }

    /// Insert a new user and persist it
    ///
    /// The name check runs against the file contents under the file lock, so
    /// a name taken through another repository on the same file is rejected
    /// too. Memory is only replaced after the write succeeds.
    pub fn insert(&self, user: User) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;

        let file_data: UserData = update_json(&self.path, |file: &mut UserData| {
            if file.users.iter().any(|u| u.matches_name(&user.name)) {
                return Err(LedgerError::Duplicate {
                    entity_type: "User",
                    identifier: user.name,
                });
            }
            file.users.push(user);
            Ok(())
        })?;
        *data = index(file_data);

        Ok(())
    }

    /// Count users
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

fn index(file_data: UserData) -> HashMap<UserId, User> {
    file_data.users.into_iter().map(|u| (u.id, u)).collect()
}
