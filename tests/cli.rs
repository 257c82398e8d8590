//! End-to-end tests driving the `splitledger` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn splitledger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("splitledger").unwrap();
    cmd.env("SPLITLEDGER_DATA_DIR", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) {
    splitledger(dir).args(args).assert().success();
}

/// Alice, Bob and Carol sharing a "Trip" group
fn trip_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    for name in ["Alice", "Bob", "Carol"] {
        run(&dir, &["user", "create", name]);
    }
    run(
        &dir,
        &[
            "group", "create", "Trip", "--member", "Alice", "--member", "Bob", "--member", "Carol",
        ],
    );
    dir
}

fn group_balances_json(dir: &TempDir, group: &str) -> serde_json::Value {
    let output = splitledger(dir)
        .args(["group", "balances", group, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn init_creates_settings_and_data_files() {
    let dir = TempDir::new().unwrap();

    splitledger(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("users.json").exists());

    splitledger(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized:      yes"))
        .stdout(predicate::str::contains("Currency symbol: $"));
}

#[test]
fn equal_expense_settles_to_payer() {
    let dir = trip_fixture();

    splitledger(&dir)
        .args([
            "expense", "add", "Trip", "--payer", "Alice", "--amount", "90", "--description",
            "Dinner",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded expense: Dinner $90.00"));

    splitledger(&dir)
        .args(["group", "balances", "trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bob pays Alice $30.00"))
        .stdout(predicate::str::contains("Carol pays Alice $30.00"));

    splitledger(&dir)
        .args(["user", "balances", "Bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-$30.00"))
        .stdout(predicate::str::contains("owes"));
}

#[test]
fn percentage_expense_and_json_output() {
    let dir = trip_fixture();

    run(
        &dir,
        &[
            "expense", "add", "Trip", "--payer", "Bob", "--amount", "100.00", "--description",
            "Groceries", "--split", "percentage", "--share", "Alice=50", "--share", "Bob=30",
            "--share", "Carol=20%",
        ],
    );

    let json = group_balances_json(&dir, "Trip");
    let nets: Vec<i64> = json["balances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["net_balance"].as_i64().unwrap())
        .collect();
    assert_eq!(nets, vec![-5000, 7000, -2000]);
    assert_eq!(nets.iter().sum::<i64>(), 0);

    let settlements = json["settlements"].as_array().unwrap();
    assert_eq!(settlements.len(), 2);
    assert!(settlements.iter().all(|s| s["to_name"] == "Bob"));
}

#[test]
fn uneven_amount_still_conserves() {
    let dir = trip_fixture();

    run(
        &dir,
        &["expense", "add", "Trip", "-p", "Carol", "-a", "100", "-d", "Tickets"],
    );
    run(
        &dir,
        &["expense", "add", "Trip", "-p", "Alice", "-a", "0.01", "-d", "Gum"],
    );

    let json = group_balances_json(&dir, "Trip");
    let total: i64 = json["balances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["net_balance"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 0);
    assert!(json["settlements"].as_array().unwrap().len() <= 2);
}

#[test]
fn rejected_expenses_leave_no_trace() {
    let dir = trip_fixture();
    run(&dir, &["user", "create", "Dave"]);

    // Percentages that do not add up to 100
    splitledger(&dir)
        .args([
            "expense", "add", "Trip", "--payer", "Alice", "--amount", "100", "--description",
            "Hotel", "--split", "percentage", "--share", "Alice=50", "--share", "Bob=29",
            "--share", "Carol=20",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sum to 100"));

    // Payer outside the group
    splitledger(&dir)
        .args([
            "expense", "add", "Trip", "--payer", "Dave", "--amount", "10", "--description", "Snacks",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User Dave is not a member of group Trip"));

    // Non-positive amount
    splitledger(&dir)
        .args([
            "expense", "add", "Trip", "--payer", "Alice", "--amount", "-5", "--description", "Refund",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));

    // Participants that leave out a member
    splitledger(&dir)
        .args([
            "expense", "add", "Trip", "--payer", "Alice", "--amount", "10", "--description", "Taxi",
            "--share", "Alice", "--share", "Bob",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing members"));

    splitledger(&dir)
        .args(["expense", "list", "Trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));

    splitledger(&dir)
        .args(["group", "balances", "Trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All settled up."));
}

#[test]
fn unknown_entities_fail() {
    let dir = trip_fixture();

    splitledger(&dir)
        .args(["group", "balances", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Group not found: Nowhere"));

    splitledger(&dir)
        .args(["group", "create", "Ghosts", "--member", "Zed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found: Zed"));

    splitledger(&dir)
        .args(["user", "create", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn listings_and_audit() {
    let dir = trip_fixture();
    run(
        &dir,
        &["expense", "add", "Trip", "-p", "Alice", "-a", "30", "-d", "Breakfast"],
    );
    run(
        &dir,
        &["expense", "add", "Trip", "-p", "Bob", "-a", "60", "-d", "Lunch"],
    );

    splitledger(&dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3 users"));

    splitledger(&dir)
        .args(["group", "show", "Trip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expenses: 2"))
        .stdout(predicate::str::contains("$90.00"));

    let output = splitledger(&dir)
        .args(["expense", "list", "Trip"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lunch = stdout.find("Lunch").unwrap();
    let breakfast = stdout.find("Breakfast").unwrap();
    assert!(lunch < breakfast, "expenses should be listed newest first");

    // 3 users + 1 group + 2 expenses
    splitledger(&dir)
        .args(["audit", "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Expense").count(2))
        .stdout(predicate::str::contains("(Lunch)"));
}
