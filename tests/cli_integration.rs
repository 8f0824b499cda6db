//! Integration tests for the pwvault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The master passphrase comes from `PWVAULT_PASSWORD` so nothing
//! prompts, and each test writes a `.pwvault.toml` with minimum Argon2
//! cost so key derivation stays fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correct-horse";

/// Helper: get a Command pointing at the pwvault binary.
fn pwvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("pwvault").expect("binary should exist")
}

/// Helper: a temp project dir with a cheap KDF config.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".pwvault.toml")
        .write_str(
            "argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n",
        )
        .unwrap();
    tmp
}

/// Helper: a command run inside `dir` with the master passphrase set.
fn in_project(dir: &TempDir) -> Command {
    let mut cmd = pwvault();
    cmd.current_dir(dir.path())
        .env("PWVAULT_PASSWORD", MASTER)
        .env_remove("PWVAULT_VAULT");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    pwvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted password vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn version_flag_shows_version() {
    pwvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pwvault"));
}

#[test]
fn no_args_shows_help() {
    pwvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_respects_length_and_classes() {
    let tmp = project();
    let output = in_project(&tmp)
        .args(["generate", "--length", "24", "--no-symbols"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let pw = stdout.trim_end();
    assert_eq!(pw.len(), 24);
    assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn generate_with_no_classes_fails() {
    let tmp = project();
    in_project(&tmp)
        .args([
            "generate",
            "--no-upper",
            "--no-lower",
            "--no-digits",
            "--no-symbols",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("policy"));
}

#[test]
fn init_creates_vault_file() {
    let tmp = project();
    in_project(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));

    tmp.child(".pwvault/vault.json")
        .assert(predicate::path::exists());
}

#[test]
fn init_twice_fails() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();
    in_project(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));
}

#[test]
fn init_rejects_short_passphrase() {
    let tmp = project();
    in_project(&tmp)
        .env("PWVAULT_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure();
    tmp.child(".pwvault/vault.json")
        .assert(predicate::path::missing());
}

#[test]
fn add_get_list_flow() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();

    in_project(&tmp)
        .args(["add", "email", "--password", "p@ss1"])
        .assert()
        .success();
    in_project(&tmp)
        .args(["add", "bank"])
        .write_stdin("b4nk\n")
        .assert()
        .success();

    in_project(&tmp)
        .args(["get", "email"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p@ss1"));

    in_project(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("email"))
        .stdout(predicate::str::contains("bank"))
        .stdout(predicate::str::contains("p@ss1").not());
}

#[test]
fn add_generate_stores_printed_password() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();

    in_project(&tmp)
        .args(["add", "wifi", "--generate", "--length", "20"])
        .assert()
        .success();

    let output = in_project(&tmp).args(["get", "wifi"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().len(), 20);
}

#[test]
fn add_with_policy_flags_generates_without_prompting() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();

    // Stdin carries a value that must not be stored.
    in_project(&tmp)
        .args(["add", "wifi", "--length", "18", "--no-symbols"])
        .write_stdin("typed-value\n")
        .assert()
        .success();

    let output = in_project(&tmp).args(["get", "wifi"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let pw = stdout.trim_end();
    assert_eq!(pw.len(), 18);
    assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn add_rejects_password_with_policy_flags() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();

    in_project(&tmp)
        .args(["add", "wifi", "--password", "p@ss1", "--length", "18"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--password"));

    in_project(&tmp)
        .args(["get", "wifi"])
        .assert()
        .failure();
}

#[test]
fn get_with_wrong_passphrase_fails() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();
    in_project(&tmp)
        .args(["add", "email", "--password", "p@ss1"])
        .assert()
        .success();

    in_project(&tmp)
        .env("PWVAULT_PASSWORD", "wrong-passphrase")
        .args(["get", "email"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("p@ss1").not());
}

#[test]
fn get_unknown_account_fails() {
    let tmp = project();
    in_project(&tmp).arg("init").assert().success();
    in_project(&tmp)
        .args(["get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn get_on_missing_vault_fails() {
    let tmp = project();
    in_project(&tmp)
        .args(["get", "email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pwvault init"));
}

#[test]
fn vault_flag_overrides_config_path() {
    let tmp = project();
    let custom = tmp.child("elsewhere/my.vault");

    in_project(&tmp)
        .args(["--vault", custom.path().to_str().unwrap(), "init"])
        .assert()
        .success();
    custom.assert(predicate::path::exists());
    tmp.child(".pwvault/vault.json")
        .assert(predicate::path::missing());

    in_project(&tmp)
        .args(["add", "email", "--password", "p@ss1"])
        .env("PWVAULT_VAULT", custom.path())
        .assert()
        .success();
    in_project(&tmp)
        .args(["--vault", custom.path().to_str().unwrap(), "get", "email"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p@ss1"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".pwvault.toml")
        .write_str("this is not = [valid toml")
        .unwrap();
    pwvault()
        .current_dir(tmp.path())
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".pwvault.toml"));
}
