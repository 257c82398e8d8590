//! Derived balance views
//!
//! Balances and settlements are computed from the ledger on every query and
//! are never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GroupId, UserId};
use super::money::Money;

/// A member's position within one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: UserId,
    pub name: String,

    /// Sum of expense amounts this member paid
    pub total_paid: Money,

    /// Sum of shares this member owes
    pub total_owed: Money,

    /// `total_paid - total_owed`; positive means the member is owed money
    pub net_balance: Money,
}

impl Balance {
    pub fn new(user_id: UserId, name: impl Into<String>, total_paid: Money, total_owed: Money) -> Self {
        Self {
            user_id,
            name: name.into(),
            total_paid,
            total_owed,
            net_balance: total_paid - total_owed,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.net_balance.is_zero()
    }
}

/// A user's net balance in one of their groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalance {
    pub group_id: GroupId,
    pub group_name: String,
    pub net_balance: Money,
}

/// A recommended payment from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from_user_id: UserId,
    pub from_name: String,
    pub to_user_id: UserId,
    pub to_name: String,
    pub amount: Money,
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from_name, self.to_name, self.amount)
    }
}
