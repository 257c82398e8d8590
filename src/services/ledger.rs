//! Ledger service
//!
//! The entry point for recording expenses and querying balances. It validates
//! requests against the store, delegates the arithmetic to the split
//! calculator, the balance aggregator and the settlement planner, and never
//! holds state of its own: every query is recomputed from the store.

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Balance, Expense, Group, GroupBalance, GroupId, Money, Settlement, SplitPolicy, User, UserId,
};
use crate::storage::LedgerStore;

use super::balance;
use super::settlement;
use super::split::{compute_splits, ParticipantInput};

/// Everything needed to record one expense
#[derive(Debug, Clone)]
pub struct RecordExpenseInput {
    pub group_id: GroupId,
    pub payer_id: UserId,
    pub amount: Money,
    pub description: String,
    pub policy: SplitPolicy,
    pub participants: Vec<ParticipantInput>,
}

/// A group's balances together with the payments that settle them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBalances {
    pub group: Group,
    pub balances: Vec<Balance>,
    pub settlements: Vec<Settlement>,
}

/// A user's net balance across every group they belong to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBalances {
    pub user: User,
    pub balances: Vec<GroupBalance>,
}

/// Service for recording expenses and computing balances
pub struct LedgerService<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> LedgerService<'a, S> {
    /// Create a new ledger service over a store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record an expense and its splits
    ///
    /// Nothing is written unless every check passes; the expense and its
    /// splits are then persisted as one unit.
    pub fn record_expense(&self, input: RecordExpenseInput) -> LedgerResult<Expense> {
        let group = self
            .store
            .get_group(input.group_id)?
            .ok_or_else(|| LedgerError::group_not_found(input.group_id.to_string()))?;

        let payer = self
            .store
            .get_user(input.payer_id)?
            .ok_or_else(|| LedgerError::user_not_found(input.payer_id.to_string()))?;

        if !group.is_member(payer.id) {
            return Err(LedgerError::InvalidPayer {
                payer: payer.name,
                group: group.name,
            });
        }

        let description = input.description.trim();
        if description.is_empty() {
            return Err(LedgerError::Validation(
                "Expense description cannot be empty".into(),
            ));
        }

        let splits = compute_splits(
            input.amount,
            input.policy,
            &input.participants,
            &group.member_set(),
        )?;

        let expense = Expense::new(group.id, payer.id, input.amount, description, input.policy);
        let expense = self.store.create_expense_with_splits(expense, splits)?;

        tracing::info!(
            expense = %expense.id,
            group = %group.name,
            payer = %payer.name,
            amount = %expense.amount,
            policy = %expense.policy,
            "recorded expense"
        );

        Ok(expense)
    }

    /// Compute every member's balance in a group and plan the settlements
    pub fn get_group_balances(&self, group_id: GroupId) -> LedgerResult<GroupBalances> {
        let group = self
            .store
            .get_group(group_id)?
            .ok_or_else(|| LedgerError::group_not_found(group_id.to_string()))?;

        let members = self.store.get_members(&group)?;
        let expenses = self.store.list_expenses_with_splits(group.id)?;

        let balances = balance::aggregate(&members, &expenses);
        let settlements = settlement::plan(&balances)?;

        Ok(GroupBalances {
            group,
            balances,
            settlements,
        })
    }

    /// Compute a user's net balance in each of their groups
    pub fn get_user_balances(&self, user_id: UserId) -> LedgerResult<UserBalances> {
        let user = self
            .store
            .get_user(user_id)?
            .ok_or_else(|| LedgerError::user_not_found(user_id.to_string()))?;

        let groups = self
            .store
            .list_memberships(user.id)?
            .into_iter()
            .map(|group| {
                let expenses = self.store.list_expenses_with_splits(group.id)?;
                Ok((group, expenses))
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        let balances = balance::aggregate_for_user(user.id, &groups);

        Ok(UserBalances { user, balances })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{Split, MAX_EXPENSE_AMOUNT};
    use crate::storage::Storage;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        alice: UserId,
        bob: UserId,
        carol: UserId,
        trip: GroupId,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let alice = User::new("Alice");
        let bob = User::new("Bob");
        let carol = User::new("Carol");
        let (a, b, c) = (alice.id, bob.id, carol.id);
        storage.users.insert(alice).unwrap();
        storage.users.insert(bob).unwrap();
        storage.users.insert(carol).unwrap();

        let trip = Group::new("Trip", [a, b, c]);
        let trip_id = trip.id;
        storage.groups.insert(trip).unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            alice: a,
            bob: b,
            carol: c,
            trip: trip_id,
        }
    }

    fn equal_expense(fx: &Fixture, payer: UserId, cents: i64) -> RecordExpenseInput {
        RecordExpenseInput {
            group_id: fx.trip,
            payer_id: payer,
            amount: Money::from_cents(cents),
            description: "Dinner".into(),
            policy: SplitPolicy::Equal,
            participants: [fx.alice, fx.bob, fx.carol]
                .into_iter()
                .map(ParticipantInput::new)
                .collect(),
        }
    }

    fn assert_conserved(balances: &GroupBalances) {
        let total: Money = balances.balances.iter().map(|b| b.net_balance).sum();
        assert!(total.is_zero(), "net balances sum to {}", total);
    }

    #[test]
    fn test_record_expense_and_settle() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);

        let expense = service
            .record_expense(equal_expense(&fx, fx.alice, 9000))
            .unwrap();
        assert_eq!(expense.splits.len(), 3);
        assert_eq!(expense.splits_total(), Money::from_cents(9000));

        let result = service.get_group_balances(fx.trip).unwrap();
        let nets: Vec<i64> = result.balances.iter().map(|b| b.net_balance.cents()).collect();
        assert_eq!(nets, vec![6000, -3000, -3000]);

        assert_eq!(result.settlements.len(), 2);
        for s in &result.settlements {
            assert_eq!(s.to_user_id, fx.alice);
            assert_eq!(s.amount, Money::from_cents(3000));
        }

        // The returned balances are the pre-settlement positions
        assert_eq!(result.balances[0].net_balance, Money::from_cents(6000));
    }

    #[test]
    fn test_percentage_expense() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);

        let expense = service
            .record_expense(RecordExpenseInput {
                policy: SplitPolicy::Percentage,
                participants: vec![
                    ParticipantInput::with_percentage(fx.alice, 50.0),
                    ParticipantInput::with_percentage(fx.bob, 30.0),
                    ParticipantInput::with_percentage(fx.carol, 20.0),
                ],
                ..equal_expense(&fx, fx.bob, 10000)
            })
            .unwrap();

        assert_eq!(expense.share_of(fx.alice), Some(Money::from_cents(5000)));
        assert_eq!(expense.share_of(fx.bob), Some(Money::from_cents(3000)));
        assert_eq!(expense.share_of(fx.carol), Some(Money::from_cents(2000)));
    }

    #[test]
    fn test_unknown_group_and_payer() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);

        let err = service
            .record_expense(RecordExpenseInput {
                group_id: GroupId::new(),
                ..equal_expense(&fx, fx.alice, 100)
            })
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .record_expense(equal_expense(&fx, UserId::new(), 100))
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(service.get_group_balances(GroupId::new()).unwrap_err().is_not_found());
        assert!(service.get_user_balances(UserId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_payer_must_be_member() {
        let fx = setup();
        let dave = User::new("Dave");
        let dave_id = dave.id;
        fx.storage.users.insert(dave).unwrap();

        let service = LedgerService::new(&fx.storage);
        let err = service
            .record_expense(equal_expense(&fx, dave_id, 100))
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidPayer { .. }));
        assert_eq!(err.to_string(), "User Dave is not a member of group Trip");
    }

    #[test]
    fn test_rejected_input_writes_nothing() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);

        let bad_inputs = vec![
            RecordExpenseInput {
                amount: Money::zero(),
                ..equal_expense(&fx, fx.alice, 0)
            },
            RecordExpenseInput {
                description: "   ".into(),
                ..equal_expense(&fx, fx.alice, 100)
            },
            RecordExpenseInput {
                participants: vec![ParticipantInput::new(fx.alice), ParticipantInput::new(fx.bob)],
                ..equal_expense(&fx, fx.alice, 100)
            },
            RecordExpenseInput {
                policy: SplitPolicy::Percentage,
                participants: vec![
                    ParticipantInput::with_percentage(fx.alice, 50.0),
                    ParticipantInput::with_percentage(fx.bob, 29.0),
                    ParticipantInput::with_percentage(fx.carol, 20.0),
                ],
                ..equal_expense(&fx, fx.alice, 100)
            },
        ];

        for input in bad_inputs {
            let err = service.record_expense(input).unwrap_err();
            assert!(err.is_validation(), "unexpected error: {}", err);
        }

        assert_eq!(fx.storage.expenses.count().unwrap(), 0);
        assert!(fx.storage.audit().read_all().unwrap().is_empty());
        let result = service.get_group_balances(fx.trip).unwrap();
        assert!(result.balances.iter().all(|b| b.is_settled()));
        assert!(result.settlements.is_empty());
    }

    #[test]
    fn test_balance_queries_are_idempotent() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);
        service
            .record_expense(equal_expense(&fx, fx.alice, 10000))
            .unwrap();
        service
            .record_expense(equal_expense(&fx, fx.carol, 2501))
            .unwrap();

        let first = service.get_group_balances(fx.trip).unwrap();
        let second = service.get_group_balances(fx.trip).unwrap();
        assert_eq!(first, second);

        let user_first = service.get_user_balances(fx.bob).unwrap();
        let user_second = service.get_user_balances(fx.bob).unwrap();
        assert_eq!(user_first, user_second);
    }

    #[test]
    fn test_conservation_after_many_expenses() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);
        let payers = [fx.alice, fx.bob, fx.carol];

        for (i, cents) in [1, 99, 100, 333, 1001, 4999, 12345, 7].into_iter().enumerate() {
            service
                .record_expense(equal_expense(&fx, payers[i % 3], cents))
                .unwrap();

            let result = service.get_group_balances(fx.trip).unwrap();
            assert_conserved(&result);
            assert!(result.settlements.len() <= 2);
        }
    }

    #[test]
    fn test_user_balances_across_groups() {
        let fx = setup();
        let flat = Group::new("Flat", [fx.alice, fx.bob]);
        let flat_id = flat.id;
        fx.storage.groups.insert(flat).unwrap();

        let service = LedgerService::new(&fx.storage);
        service
            .record_expense(equal_expense(&fx, fx.alice, 9000))
            .unwrap();
        service
            .record_expense(RecordExpenseInput {
                group_id: flat_id,
                participants: vec![ParticipantInput::new(fx.alice), ParticipantInput::new(fx.bob)],
                ..equal_expense(&fx, fx.bob, 5000)
            })
            .unwrap();

        let result = service.get_user_balances(fx.alice).unwrap();
        assert_eq!(result.user.name, "Alice");
        assert_eq!(result.balances.len(), 2);

        let flat_balance = result.balances.iter().find(|b| b.group_name == "Flat").unwrap();
        let trip_balance = result.balances.iter().find(|b| b.group_name == "Trip").unwrap();
        assert_eq!(flat_balance.net_balance, Money::from_cents(-2500));
        assert_eq!(trip_balance.net_balance, Money::from_cents(6000));

        let carol = service.get_user_balances(fx.carol).unwrap();
        assert_eq!(carol.balances.len(), 1);
    }

    #[test]
    fn test_concurrent_record_expense_conserves_money() {
        let fx = setup();
        let payers = [fx.alice, fx.bob, fx.carol];

        std::thread::scope(|scope| {
            for t in 0..4 {
                let fx = &fx;
                scope.spawn(move || {
                    let service = LedgerService::new(&fx.storage);
                    for i in 0..10 {
                        let cents = 100 + (t * 10 + i) as i64 * 37;
                        service
                            .record_expense(equal_expense(fx, payers[(t + i) % 3], cents))
                            .unwrap();
                        assert_conserved(&service.get_group_balances(fx.trip).unwrap());
                    }
                });
            }
        });

        let service = LedgerService::new(&fx.storage);
        let result = service.get_group_balances(fx.trip).unwrap();
        assert_conserved(&result);
        assert_eq!(fx.storage.expenses.count().unwrap(), 40);

        // Everything recorded concurrently was also persisted
        let mut reloaded = Storage::new(fx.storage.paths().clone()).unwrap();
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.expenses.count().unwrap(), 40);
    }

    #[test]
    fn test_separate_stores_keep_each_others_expenses() {
        let fx = setup();
        // A second handle on the same data directory, loaded before any expense
        let mut other = Storage::new(fx.storage.paths().clone()).unwrap();
        other.load_all().unwrap();

        std::thread::scope(|scope| {
            for (t, store) in [&fx.storage, &other].into_iter().enumerate() {
                let fx = &fx;
                scope.spawn(move || {
                    let service = LedgerService::new(store);
                    for i in 0..10 {
                        let payer = if t == 0 { fx.alice } else { fx.bob };
                        service
                            .record_expense(equal_expense(fx, payer, 300 + i))
                            .unwrap();
                    }
                });
            }
        });

        let mut reloaded = Storage::new(fx.storage.paths().clone()).unwrap();
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.expenses.count().unwrap(), 20);

        let result = LedgerService::new(&reloaded).get_group_balances(fx.trip).unwrap();
        assert_conserved(&result);
        let paid: Vec<i64> = result.balances.iter().map(|b| b.total_paid.cents()).collect();
        assert_eq!(paid, vec![3045, 3045, 0]);

        // Each handle has picked up the other's rows through its own writes
        assert_eq!(reloaded.audit().read_all().unwrap().len(), 20);
        assert!(fx.storage.expenses.count().unwrap() >= 10);
        assert!(other.expenses.count().unwrap() >= 10);
    }

    #[test]
    fn test_maximum_amount_expenses_balance_without_overflow() {
        let fx = setup();
        let service = LedgerService::new(&fx.storage);

        for payer in [fx.alice, fx.alice, fx.bob] {
            service
                .record_expense(equal_expense(&fx, payer, MAX_EXPENSE_AMOUNT.cents()))
                .unwrap();
        }

        let result = service.get_group_balances(fx.trip).unwrap();
        assert_conserved(&result);
        assert_eq!(result.balances[0].total_paid.cents(), 2 * MAX_EXPENSE_AMOUNT.cents());
        assert_eq!(result.balances[2].total_owed.cents(), 3 * 333_333_333_333);

        let err = service
            .record_expense(equal_expense(&fx, fx.carol, 92_000_000_000_000_000))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(fx.storage.expenses.count().unwrap(), 3);
    }

    /// A store whose writes always fail
    struct FailingStore<'a> {
        inner: &'a Storage,
    }

    impl LedgerStore for FailingStore<'_> {
        fn get_user(&self, id: UserId) -> LedgerResult<Option<User>> {
            self.inner.get_user(id)
        }

        fn get_group(&self, id: GroupId) -> LedgerResult<Option<Group>> {
            self.inner.get_group(id)
        }

        fn list_expenses_with_splits(&self, group_id: GroupId) -> LedgerResult<Vec<Expense>> {
            self.inner.list_expenses_with_splits(group_id)
        }

        fn create_expense_with_splits(
            &self,
            _expense: Expense,
            _splits: Vec<Split>,
        ) -> LedgerResult<Expense> {
            Err(LedgerError::Store("connection reset".into()))
        }

        fn list_memberships(&self, user_id: UserId) -> LedgerResult<Vec<Group>> {
            self.inner.list_memberships(user_id)
        }
    }

    #[test]
    fn test_store_failure_propagates() {
        let fx = setup();
        let store = FailingStore {
            inner: &fx.storage,
        };
        let service = LedgerService::new(&store);

        let err = service
            .record_expense(equal_expense(&fx, fx.alice, 9000))
            .unwrap_err();
        assert!(err.is_store());

        // Reads through the default member lookup still work
        let result = service.get_group_balances(fx.trip).unwrap();
        assert_eq!(result.balances.len(), 3);
        assert!(result.settlements.is_empty());
    }
}
