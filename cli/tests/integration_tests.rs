use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a test command with an isolated config directory.
/// The returned `TempDir` must outlive the command.
fn dao_cmd() -> (Command, TempDir) {
    let home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("dao-cli").unwrap();

    cmd.env("HOME", home.path());
    cmd.env("USERPROFILE", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd.env_remove("RUST_LOG");

    (cmd, home)
}

fn dao_cmd_in(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dao-cli").unwrap();

    cmd.env("HOME", home.path());
    cmd.env("USERPROFILE", home.path());
    cmd.env("XDG_CONFIG_HOME", home.path().join(".config"));

    cmd
}

#[test]
fn test_cli_runs() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_shows_help() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("propose"))
        .stdout(predicate::str::contains("vote"))
        .stdout(predicate::str::contains("execute"));
}

#[test]
fn test_config_show() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("DAO CLI Configuration"))
        .stdout(predicate::str::contains("devnet"));
}

#[test]
fn test_config_set_cluster_persists() {
    let (mut cmd, home) = dao_cmd();
    cmd.arg("config")
        .arg("set-cluster")
        .arg("localnet")
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:8899"));

    dao_cmd_in(&home)
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("localnet"));
}

#[test]
fn test_config_set_cluster_invalid() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("config")
        .arg("set-cluster")
        .arg("invalid-cluster")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid cluster"));
}

#[test]
fn test_wallet_create_then_address() {
    let (mut cmd, home) = dao_cmd();
    cmd.arg("wallet")
        .arg("create")
        .assert()
        .success()
        .stdout(predicate::str::contains("New wallet created"));

    dao_cmd_in(&home)
        .arg("wallet")
        .arg("address")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wallet Address"));
}

#[test]
fn test_wallet_address_without_wallet() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("wallet")
        .arg("address")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wallet not found"));
}

#[test]
fn test_wallet_import_missing_file() {
    let (mut cmd, home) = dao_cmd();
    let missing = home.path().join("missing.json");

    cmd.arg("wallet")
        .arg("import")
        .arg("--keypair")
        .arg(missing.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Keypair file not found"));
}

#[test]
fn test_propose_requires_item() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("propose").assert().failure();
}

#[test]
fn test_propose_without_wallet() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("propose")
        .arg("--item")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wallet not found"));
}

#[test]
fn test_vote_rejects_unknown_choice() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("vote")
        .arg("--proposal")
        .arg("0")
        .arg("--choice")
        .arg("abstain")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_vote_requires_proposal() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("vote")
        .arg("--choice")
        .arg("yay")
        .assert()
        .failure();
}

#[test]
fn test_execute_requires_proposal() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("execute").assert().failure();
}

#[test]
fn test_deposit_zero_rejected() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("deposit")
        .arg("--amount")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_deposit_rejects_non_numeric_amount() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("deposit")
        .arg("--amount")
        .arg("lots")
        .assert()
        .failure();
}

#[test]
fn test_init_requires_target() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("init").assert().failure();
}

#[test]
fn test_membership_mint_requires_recipient() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("membership").arg("mint").assert().failure();
}

#[test]
fn test_market_show_requires_item() {
    let (mut cmd, _home) = dao_cmd();
    cmd.arg("market").arg("show").assert().failure();
}
