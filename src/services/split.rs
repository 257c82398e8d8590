//! Split calculation
//!
//! Turns an expense amount, a split policy and the participants' inputs into
//! one `Split` per participant. Shares are whole cents: each participant gets
//! the floor of its exact share, and leftover cents go one at a time to the
//! participants with the largest fractional remainder (earliest participant
//! first on ties). The shares therefore always add up to the amount exactly.

use std::collections::BTreeSet;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Split, SplitPolicy, UserId, MAX_EXPENSE_AMOUNT};

/// Relative tolerance for percentages summing to 100
pub const PERCENTAGE_TOLERANCE: f64 = 1e-5;

/// One participant's input to a split
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipantInput {
    pub user_id: UserId,
    /// Required for the percentage policy, ignored otherwise
    pub percentage: Option<f64>,
}

impl ParticipantInput {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            percentage: None,
        }
    }

    pub fn with_percentage(user_id: UserId, percentage: f64) -> Self {
        Self {
            user_id,
            percentage: Some(percentage),
        }
    }
}

/// Compute every participant's share of an expense
///
/// `member_ids` is the group's current membership; the participants must
/// match it exactly.
pub fn compute_splits(
    amount: Money,
    policy: SplitPolicy,
    participants: &[ParticipantInput],
    member_ids: &BTreeSet<UserId>,
) -> LedgerResult<Vec<Split>> {
    if !amount.is_positive() {
        return Err(LedgerError::Validation(format!(
            "Expense amount must be positive, got {}",
            amount
        )));
    }

    if amount > MAX_EXPENSE_AMOUNT {
        return Err(LedgerError::Validation(format!(
            "Expense amount {} exceeds the maximum of {}",
            amount, MAX_EXPENSE_AMOUNT
        )));
    }

    validate_participants(participants, member_ids)?;

    match policy {
        SplitPolicy::Equal => {
            let weights = vec![1.0; participants.len()];
            let shares = apportion(amount.cents(), &weights);
            Ok(participants
                .iter()
                .zip(shares)
                .map(|(p, cents)| Split::new(p.user_id, Money::from_cents(cents)))
                .collect())
        }
        SplitPolicy::Percentage => {
            let percentages = validate_percentages(participants)?;
            let shares = apportion(amount.cents(), &percentages);
            Ok(participants
                .iter()
                .zip(percentages)
                .zip(shares)
                .map(|((p, pct), cents)| {
                    Split::with_percentage(p.user_id, Money::from_cents(cents), pct)
                })
                .collect())
        }
    }
}

fn validate_participants(
    participants: &[ParticipantInput],
    member_ids: &BTreeSet<UserId>,
) -> LedgerResult<()> {
    if participants.is_empty() {
        return Err(LedgerError::Validation(
            "An expense needs at least one participant".into(),
        ));
    }

    let mut seen = BTreeSet::new();
    for p in participants {
        if !seen.insert(p.user_id) {
            return Err(LedgerError::Validation(format!(
                "Participant {} is listed more than once",
                p.user_id
            )));
        }
    }

    if &seen != member_ids {
        let missing: Vec<String> = member_ids.difference(&seen).map(|id| id.to_string()).collect();
        let outsiders: Vec<String> = seen.difference(member_ids).map(|id| id.to_string()).collect();

        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("missing members: {}", missing.join(", ")));
        }
        if !outsiders.is_empty() {
            problems.push(format!("not group members: {}", outsiders.join(", ")));
        }

        return Err(LedgerError::Validation(format!(
            "Splits must include exactly the group members ({})",
            problems.join("; ")
        )));
    }

    Ok(())
}

fn validate_percentages(participants: &[ParticipantInput]) -> LedgerResult<Vec<f64>> {
    let mut percentages = Vec::with_capacity(participants.len());

    for p in participants {
        match p.percentage {
            Some(pct) if pct.is_finite() && pct >= 0.0 => percentages.push(pct),
            Some(pct) => {
                return Err(LedgerError::Validation(format!(
                    "Percentage for {} must be non-negative, got {}",
                    p.user_id, pct
                )))
            }
            None => {
                return Err(LedgerError::Validation(format!(
                    "Percentage split requires a percentage for every participant (missing for {})",
                    p.user_id
                )))
            }
        }
    }

    let total: f64 = percentages.iter().sum();
    if !is_close(total, 100.0, PERCENTAGE_TOLERANCE) {
        return Err(LedgerError::Validation(format!(
            "Percentages must sum to 100, got {}",
            total
        )));
    }

    Ok(percentages)
}

/// Relative closeness: `|a - b| <= tolerance * max(|a|, |b|)`
fn is_close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs())
}

/// Divide `total` cents proportionally to `weights` using largest remainders
fn apportion(total: i64, weights: &[f64]) -> Vec<i64> {
    let weight_sum: f64 = weights.iter().sum();
    if weights.is_empty() || weight_sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|w| total as f64 * w / weight_sum)
        .collect();
    let mut shares: Vec<i64> = exact.iter().map(|x| x.floor() as i64).collect();
    let mut leftover = total - shares.iter().sum::<i64>();

    // Stable sort keeps earlier participants first among equal remainders
    let mut order: Vec<usize> = (0..weights.len()).collect();
    let remainder = |i: usize| exact[i] - exact[i].floor();
    order.sort_by(|&a, &b| remainder(b).total_cmp(&remainder(a)));

    for &i in order.iter().cycle() {
        if leftover <= 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }

    // Float error can push a floor one cent high; take it back from the
    // smallest remainders
    for &i in order.iter().rev() {
        if leftover >= 0 {
            break;
        }
        if shares[i] > 0 {
            shares[i] -= 1;
            leftover += 1;
        }
    }

    shares
}
