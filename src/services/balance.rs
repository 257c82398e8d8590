//! Balance aggregation
//!
//! Folds a group's expenses into per-member totals. Everything here is a pure
//! function of its inputs; nothing is cached or persisted.

use std::collections::HashMap;

use crate::models::{Balance, Expense, Group, GroupBalance, Money, User, UserId};

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    paid: Money,
    owed: Money,
}

/// Paid and owed totals per user across `expenses`
fn totals_by_user(expenses: &[Expense]) -> HashMap<UserId, Totals> {
    let mut totals: HashMap<UserId, Totals> = HashMap::new();

    for expense in expenses {
        totals.entry(expense.payer_id).or_default().paid += expense.amount;
        for split in &expense.splits {
            totals.entry(split.user_id).or_default().owed += split.share;
        }
    }

    totals
}

/// Compute every member's paid, owed and net totals for one group
///
/// The result has one entry per member, in member order, including members
/// who never paid or owed anything.
pub fn aggregate(members: &[User], expenses: &[Expense]) -> Vec<Balance> {
    let totals = totals_by_user(expenses);

    let balances: Vec<Balance> = members
        .iter()
        .map(|user| {
            let t = totals.get(&user.id).copied().unwrap_or_default();
            Balance::new(user.id, user.name.clone(), t.paid, t.owed)
        })
        .collect();

    tracing::debug!(
        members = members.len(),
        expenses = expenses.len(),
        "aggregated group balances"
    );

    balances
}

/// Compute one user's net balance in each of the given groups
pub fn aggregate_for_user(user_id: UserId, groups: &[(Group, Vec<Expense>)]) -> Vec<GroupBalance> {
    groups
        .iter()
        .map(|(group, expenses)| {
            let t = totals_by_user(expenses)
                .get(&user_id)
                .copied()
                .unwrap_or_default();

            GroupBalance {
                group_id: group.id,
                group_name: group.name.clone(),
                net_balance: t.paid - t.owed,
            }
        })
        .collect()
}

/// Total amount spent in a set of expenses
pub fn total_spent(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Split, SplitPolicy};

    fn expense(group: &Group, payer: UserId, splits: &[(UserId, i64)]) -> Expense {
        let amount: i64 = splits.iter().map(|(_, c)| c).sum();
        let mut expense = Expense::new(
            group.id,
            payer,
            Money::from_cents(amount),
            "Test",
            SplitPolicy::Equal,
        );
        expense.splits = splits
            .iter()
            .map(|&(id, cents)| Split::new(id, Money::from_cents(cents)))
            .collect();
        expense
    }

    #[test]
    fn test_aggregate_single_expense() {
        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let carol = User::new("Carol");
        let group = Group::new("Trip", [alice.id, bob.id, carol.id]);

        let expenses = vec![expense(
            &group,
            alice.id,
            &[(alice.id, 3000), (bob.id, 3000), (carol.id, 3000)],
        )];
        let members = vec![alice.clone(), bob.clone(), carol.clone()];
        let balances = aggregate(&members, &expenses);

        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].name, "Alice");
        assert_eq!(balances[0].total_paid, Money::from_cents(9000));
        assert_eq!(balances[0].total_owed, Money::from_cents(3000));
        assert_eq!(balances[0].net_balance, Money::from_cents(6000));
        assert_eq!(balances[1].net_balance, Money::from_cents(-3000));
        assert_eq!(balances[2].net_balance, Money::from_cents(-3000));
    }

    #[test]
    fn test_aggregate_includes_idle_members() {
        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let balances = aggregate(&[alice, bob], &[]);

        assert_eq!(balances.len(), 2);
        assert!(balances.iter().all(|b| b.is_settled()));
        assert!(balances.iter().all(|b| b.total_paid.is_zero()));
    }

    #[test]
    fn test_aggregate_conserves_money() {
        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let group = Group::new("Flat", [alice.id, bob.id]);

        let expenses = vec![
            expense(&group, alice.id, &[(alice.id, 1667), (bob.id, 1666)]),
            expense(&group, bob.id, &[(alice.id, 250), (bob.id, 750)]),
            expense(&group, bob.id, &[(alice.id, 1), (bob.id, 0)]),
        ];
        let balances = aggregate(&[alice, bob], &expenses);

        let net: Money = balances.iter().map(|b| b.net_balance).sum();
        assert!(net.is_zero());
        let paid: Money = balances.iter().map(|b| b.total_paid).sum();
        assert_eq!(paid, total_spent(&expenses));
    }

    #[test]
    fn test_aggregate_for_user() {
        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let trip = Group::new("Trip", [alice.id, bob.id]);
        let flat = Group::new("Flat", [alice.id, bob.id]);

        let trip_expenses = vec![expense(&trip, alice.id, &[(alice.id, 500), (bob.id, 500)])];
        let flat_expenses = vec![expense(&flat, bob.id, &[(alice.id, 2000), (bob.id, 2000)])];

        let balances =
            aggregate_for_user(alice.id, &[(trip, trip_expenses), (flat, flat_expenses)]);

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].group_name, "Trip");
        assert_eq!(balances[0].net_balance, Money::from_cents(500));
        assert_eq!(balances[1].group_name, "Flat");
        assert_eq!(balances[1].net_balance, Money::from_cents(-2000));
    }

    #[test]
    fn test_group_and_user_views_agree() {
        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let carol = User::new("Carol");
        let group = Group::new("Trip", [alice.id, bob.id, carol.id]);

        let expenses = vec![
            expense(&group, alice.id, &[(alice.id, 334), (bob.id, 333), (carol.id, 333)]),
            expense(&group, carol.id, &[(alice.id, 0), (bob.id, 1200), (carol.id, 800)]),
        ];
        let members = vec![alice.clone(), bob.clone(), carol.clone()];
        let by_group = aggregate(&members, &expenses);

        for (member, balance) in members.iter().zip(&by_group) {
            let by_user = aggregate_for_user(member.id, &[(group.clone(), expenses.clone())]);
            assert_eq!(by_user[0].net_balance, balance.net_balance, "{}", member.name);
        }
    }
}
