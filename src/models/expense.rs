//! Expense model
//!
//! An expense is a single payment by one group member, divided among every
//! member of the group according to a split policy. The per-member shares are
//! stored on the expense itself, so an expense and its splits are always
//! written and read as one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ids::{ExpenseId, GroupId, UserId};
use super::money::Money;

/// Largest amount a single expense may carry: $10,000,000,000.00
///
/// Keeps every share below 2^53 cents during apportionment, and leaves room
/// to sum millions of expenses per group within an `i64`.
pub const MAX_EXPENSE_AMOUNT: Money = Money::from_cents(1_000_000_000_000);

/// How an expense amount is divided among participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Every participant owes the same share
    #[default]
    Equal,
    /// Every participant owes a stated percentage of the amount
    Percentage,
}

impl SplitPolicy {
    /// Parse a split policy from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "equal" | "equally" => Some(Self::Equal),
            "percentage" | "percent" | "pct" => Some(Self::Percentage),
            _ => None,
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Percentage => write!(f, "percentage"),
        }
    }
}

/// One member's owed portion of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// The member who owes this share
    pub user_id: UserId,

    /// Amount owed
    pub share: Money,

    /// The percentage that produced the share (percentage policy only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Split {
    pub fn new(user_id: UserId, share: Money) -> Self {
        Self {
            user_id,
            share,
            percentage: None,
        }
    }

    pub fn with_percentage(user_id: UserId, share: Money, percentage: f64) -> Self {
        Self {
            user_id,
            share,
            percentage: Some(percentage),
        }
    }
}

/// A shared expense within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// The group this expense belongs to
    pub group_id: GroupId,

    /// What the money was spent on
    pub description: String,

    /// Total amount paid (always positive)
    pub amount: Money,

    /// The member who paid
    pub payer_id: UserId,

    /// How the amount was divided
    pub policy: SplitPolicy,

    /// One split per group member
    #[serde(default)]
    pub splits: Vec<Split>,

    /// When the expense was recorded
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense without splits
    pub fn new(
        group_id: GroupId,
        payer_id: UserId,
        amount: Money,
        description: impl Into<String>,
        policy: SplitPolicy,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            group_id,
            description: description.into(),
            amount,
            payer_id,
            policy,
            splits: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Get the total of all splits (should equal the expense amount)
    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.share).sum()
    }

    /// The share owed by a user, if they participate in this expense
    pub fn share_of(&self, user_id: UserId) -> Option<Money> {
        self.splits
            .iter()
            .find(|s| s.user_id == user_id)
            .map(|s| s.share)
    }

    /// The set of users holding a split
    pub fn participant_set(&self) -> BTreeSet<UserId> {
        self.splits.iter().map(|s| s.user_id).collect()
    }

    /// Validate the expense together with its splits
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > MAX_EXPENSE_AMOUNT {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        if self.splits.is_empty() {
            return Err(ExpenseValidationError::NoSplits);
        }

        if self.participant_set().len() != self.splits.len() {
            return Err(ExpenseValidationError::DuplicateParticipant);
        }

        if let Some(split) = self.splits.iter().find(|s| s.share.is_negative()) {
            return Err(ExpenseValidationError::NegativeShare(split.user_id));
        }

        // Bounded shares keep the total below i64::MAX
        if let Some(split) = self.splits.iter().find(|s| s.share > self.amount) {
            return Err(ExpenseValidationError::ShareExceedsAmount(split.user_id));
        }

        let splits_total = self.splits_total();
        if splits_total != self.amount {
            return Err(ExpenseValidationError::SplitsMismatch {
                expense_amount: self.amount,
                splits_total,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.created_at.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    NoSplits,
    DuplicateParticipant,
    NegativeShare(UserId),
    ShareExceedsAmount(UserId),
    SplitsMismatch {
        expense_amount: Money,
        splits_total: Money,
    },
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Expense amount {} exceeds the maximum of {}",
                amount, MAX_EXPENSE_AMOUNT
            ),
            Self::NoSplits => write!(f, "Expense must have at least one split"),
            Self::DuplicateParticipant => {
                write!(f, "Expense has more than one split for the same user")
            }
            Self::NegativeShare(user_id) => write!(f, "Split for {} is negative", user_id),
            Self::ShareExceedsAmount(user_id) => {
                write!(f, "Split for {} exceeds the expense amount", user_id)
            }
            Self::SplitsMismatch {
                expense_amount,
                splits_total,
            } => write!(
                f,
                "Split totals ({}) do not match expense amount ({})",
                splits_total, expense_amount
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
