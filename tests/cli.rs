use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tally(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("TALLY_DATA_DIR", dir.path())
        .env("TALLY_ACTOR", "Reza")
        .env("RUST_LOG", "off");
    cmd
}

/// Initialized directory with Cash (100000), an empty Bank and actor Reza
fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    tally(&dir).arg("init").assert().success();
    tally(&dir).args(["actor", "add", "Reza"]).assert().success();
    tally(&dir)
        .args(["method", "create", "Cash", "--initial", "100000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created payment method: Cash"));
    tally(&dir)
        .args(["method", "create", "Bank"])
        .assert()
        .success();
    dir
}

fn first_entry_id(dir: &TempDir, method: &str) -> String {
    let output = tally(dir)
        .args(["entries", "--method", method, "--limit", "1"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .split_whitespace()
        .find(|token| token.starts_with("ent-"))
        .unwrap()
        .to_string()
}

#[test]
fn test_init_is_repeatable() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    tally(&dir).arg("init").assert().success();

    tally(&dir)
        .args(["actor", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("System").count(1));
}

#[test]
fn test_expense_then_income() {
    let dir = setup();

    tally(&dir)
        .args(["expense", "Cash", "30000", "--summary", "groceries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cash balance: Rp70000.00"));
    tally(&dir)
        .args(["income", "Cash", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cash balance: Rp75000.00"));

    tally(&dir)
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp75000.00"))
        .stdout(predicate::str::contains("TOTAL"));
}

#[test]
fn test_transfer_moves_both_sides() {
    let dir = setup();

    tally(&dir)
        .args(["transfer", "Cash", "Bank", "25000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cash balance: Rp75000.00"))
        .stdout(predicate::str::contains("Bank balance: Rp25000.00"));

    tally(&dir)
        .args(["entries", "--method", "Bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("transfer"))
        .stdout(predicate::str::contains("Cash -> Bank"));
}

#[test]
fn test_transfer_to_same_method_fails() {
    let dir = setup();

    tally(&dir)
        .args(["transfer", "Cash", "cash", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("to itself"));

    tally(&dir)
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp100000.00"));
}

#[test]
fn test_invalid_amounts_are_rejected() {
    let dir = setup();

    tally(&dir)
        .args(["income", "Cash", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than zero"));
    tally(&dir)
        .args(["income", "Cash", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount 'lots'"));
    tally(&dir)
        .args(["income", "Wallet", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payment method not found: Wallet"));
}

#[test]
fn test_overdraft_needs_flag() {
    let dir = setup();

    tally(&dir)
        .args(["expense", "Bank", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient funds in 'Bank'"));

    tally(&dir)
        .args(["expense", "Bank", "500", "--allow-overdraft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bank balance: -Rp500.00"));
}

#[test]
fn test_named_actor() {
    let dir = setup();
    tally(&dir).args(["actor", "add", "Dina"]).assert().success();

    tally(&dir)
        .args(["income", "Cash", "10", "--actor", "dina"])
        .assert()
        .success();
    tally(&dir)
        .args(["income", "Cash", "10", "--actor", "Budi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Actor not found: Budi"));
}

#[test]
fn test_recording_requires_an_actor() {
    let dir = setup();

    for args in [
        vec!["income", "Cash", "10"],
        vec!["expense", "Cash", "10"],
        vec!["transfer", "Cash", "Bank", "10"],
    ] {
        tally(&dir)
            .env_remove("TALLY_ACTOR")
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("An actor is required"));
    }

    tally(&dir)
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp100000.00"));
}

#[test]
fn test_negative_initial_balance_with_symbol() {
    let dir = setup();

    tally(&dir)
        .args(["method", "create", "Card", "--initial", "Rp-100"])
        .assert()
        .success();
    tally(&dir)
        .args(["method", "create", "Loan", "--initial", "abc100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount 'abc100'"));

    tally(&dir)
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("-Rp100.00"))
        .stdout(predicate::str::contains("Loan").not());
}

#[test]
fn test_reconcile_check_and_all() {
    let dir = setup();
    tally(&dir)
        .args(["transfer", "Cash", "Bank", "100"])
        .assert()
        .success();

    tally(&dir)
        .args(["reconcile", "Cash", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries replayed:   2"))
        .stdout(predicate::str::contains("Drift:              none"));

    tally(&dir)
        .args(["reconcile", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reconciled 2 payment method(s), 0 corrected, 0 failed",
        ));
}

#[test]
fn test_reconcile_requires_a_target() {
    let dir = setup();

    tally(&dir)
        .arg("reconcile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Specify a payment method or --all"));
    tally(&dir)
        .args(["reconcile", "--check"])
        .assert()
        .failure();
}

#[test]
fn test_deleted_entry_is_corrected_by_reconcile() {
    let dir = setup();
    tally(&dir)
        .args(["income", "Bank", "700"])
        .assert()
        .success();

    let id = first_entry_id(&dir, "Bank");
    tally(&dir)
        .args(["delete-entry", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted entry:"));

    // Cached value still reflects the deleted entry
    tally(&dir)
        .args(["reconcile", "Bank", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drift:              -Rp700.00"));

    tally(&dir)
        .args(["reconcile", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 corrected"));

    tally(&dir)
        .args(["delete-entry", &id])
        .assert()
        .failure();
}

#[test]
fn test_method_list_and_retire() {
    let dir = setup();

    tally(&dir)
        .args(["method", "retire", "Bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Retired payment method: Bank"));

    tally(&dir)
        .args(["method", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cash"))
        .stdout(predicate::str::contains("Bank").not());
    tally(&dir)
        .args(["method", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Retired"));

    tally(&dir)
        .args(["income", "Bank", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is retired"));
}

#[test]
fn test_entries_empty_and_listed() {
    let dir = TempDir::new().unwrap();
    tally(&dir).arg("init").assert().success();
    tally(&dir)
        .arg("entries")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));

    let dir = setup();
    tally(&dir)
        .args(["expense", "Cash", "42", "--summary", "coffee"])
        .assert()
        .success();
    tally(&dir)
        .arg("entries")
        .assert()
        .success()
        .stdout(predicate::str::contains("coffee"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_audit_lists_changes() {
    let dir = setup();
    tally(&dir)
        .args(["income", "Cash", "50"])
        .assert()
        .success();

    tally(&dir)
        .args(["audit", "--limit", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE PaymentMethod"))
        .stdout(predicate::str::contains("UPDATE Balance"))
        .stdout(predicate::str::contains("balance: 10000000 -> 10005000"));
}
