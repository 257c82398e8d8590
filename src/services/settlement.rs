//! Settlement planning
//!
//! Produces a short list of payments that zeroes every member's net balance.
//! Members are ordered from largest debtor to largest creditor; the two ends
//! repeatedly settle `min(debt, credit)` and move inward. Each payment zeroes
//! at least one side, so a group of N members needs at most N - 1 payments.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Balance, Money, Settlement};

/// Plan the payments that settle a group
///
/// The input is not modified. Balances must sum to zero; anything else means
/// the ledger data is inconsistent and is reported as an invariant violation.
pub fn plan(balances: &[Balance]) -> LedgerResult<Vec<Settlement>> {
    let total: Money = balances.iter().map(|b| b.net_balance).sum();
    if !total.is_zero() {
        tracing::error!(
            total_cents = total.cents(),
            members = balances.len(),
            "group balances do not sum to zero"
        );
        return Err(LedgerError::InvariantViolation(format!(
            "group balances sum to {} instead of zero",
            total
        )));
    }

    // Working copy of (balance, remaining net); stable sort keeps member order on ties
    let mut remaining: Vec<(&Balance, Money)> =
        balances.iter().map(|b| (b, b.net_balance)).collect();
    remaining.sort_by_key(|(_, net)| *net);

    let mut settlements = Vec::new();
    if remaining.len() < 2 {
        return Ok(settlements);
    }

    let (mut i, mut j) = (0, remaining.len() - 1);
    while i < j {
        let (debtor, debt) = remaining[i];
        let (creditor, credit) = remaining[j];

        if !debt.is_negative() {
            i += 1;
            continue;
        }
        if !credit.is_positive() {
            j -= 1;
            continue;
        }

        let amount = (-debt).min(credit);
        settlements.push(Settlement {
            from_user_id: debtor.user_id,
            from_name: debtor.name.clone(),
            to_user_id: creditor.user_id,
            to_name: creditor.name.clone(),
            amount,
        });

        remaining[i].1 += amount;
        remaining[j].1 -= amount;
    }

    tracing::debug!(
        members = balances.len(),
        settlements = settlements.len(),
        "planned settlements"
    );

    Ok(settlements)
}
