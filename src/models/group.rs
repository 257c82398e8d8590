//! Group model
//!
//! A named set of users who share expenses. Membership is many-to-many: a user
//! may belong to several groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::{GroupId, UserId};
use super::user::{normalize_name, validate_name, NameValidationError};

/// A cost-sharing group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,

    /// Group name
    pub name: String,

    /// Member user IDs in the order they were added
    pub member_ids: Vec<UserId>,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group; repeated member IDs are collapsed to their first occurrence
    pub fn new(name: impl Into<String>, member_ids: impl IntoIterator<Item = UserId>) -> Self {
        let mut seen = BTreeSet::new();
        let member_ids = member_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        Self {
            id: GroupId::new(),
            name: name.into(),
            member_ids,
            created_at: Utc::now(),
        }
    }

    /// Check whether a user belongs to this group
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// The member IDs as a set, for exact-match comparisons
    pub fn member_set(&self) -> BTreeSet<UserId> {
        self.member_ids.iter().copied().collect()
    }

    /// Check if this group matches a name (case-insensitive)
    pub fn matches_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }

    /// Validate the group
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        validate_name(&self.name).map_err(GroupValidationError::Name)?;

        if self.member_ids.is_empty() {
            return Err(GroupValidationError::NoMembers);
        }

        Ok(())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    Name(NameValidationError),
    NoMembers,
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(e) => write!(f, "Group {}", e.to_string().to_lowercase()),
            Self::NoMembers => write!(f, "Group must have at least one member"),
        }
    }
}

impl std::error::Error for GroupValidationError {}
