//! User service
//!
//! Provides business logic for creating and looking up users.

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new user
    pub fn create(&self, name: &str) -> LedgerResult<User> {
        let user = User::new(name.trim());
        user.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        // Duplicate names are rejected by the repository under its write lock
        self.storage.users.insert(user.clone())?;

        self.storage.log_create(
            EntityType::User,
            user.id.to_string(),
            Some(user.name.clone()),
            &user,
        );
        tracing::info!(user = %user.id, name = %user.name, "created user");

        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> LedgerResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// All users sorted by name
    pub fn list(&self) -> LedgerResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Find a user by ID, short ID or name
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<User>> {
        let identifier = identifier.trim();

        if let Ok(id) = identifier.parse::<UserId>() {
            if let Some(user) = self.storage.users.get(id)? {
                return Ok(Some(user));
            }
        }

        if let Some(user) = self.storage.users.get_by_name(identifier)? {
            return Ok(Some(user));
        }

        Ok(self
            .storage
            .users
            .get_all()?
            .into_iter()
            .find(|u| u.id.to_string() == identifier))
    }

    /// Find a user or fail with `NotFound`
    pub fn resolve(&self, identifier: &str) -> LedgerResult<User> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::user_not_found(identifier))
    }
}
