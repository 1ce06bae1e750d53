#![allow(deprecated)]

//! Binary-level tests for the headless commands
//!
//! Each test points the binary at a session store in a temporary directory
//! and a config path that does not exist, so only defaults and the flags
//! under test apply.
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use velrath::storage::{keys, SessionStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn velrath(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("velrath").unwrap();
    cmd.env_remove("VELRATH_TOKEN")
        .env_remove("VELRATH_API_BASE")
        .env_remove("VELRATH_TIMEOUT_SECONDS")
        .env_remove("VELRATH_SESSION_STORE")
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("--store-path")
        .arg(common::store_path(dir));
    cmd
}

#[test]
fn test_status_without_session() {
    let dir = TempDir::new().unwrap();
    velrath(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn test_status_json_hides_token() {
    let dir = TempDir::new().unwrap();
    {
        let store = SessionStore::new_with_path(common::store_path(&dir)).unwrap();
        store.set(keys::DISCORD_TOKEN, "secret-token").unwrap();
        store.set(keys::USER_DATA, &common::user_body(3)).unwrap();
    }

    velrath(&dir)
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"token_stored\": true"))
        .stdout(predicate::str::contains("nelly"))
        .stdout(predicate::str::contains("secret-token").not());
}

#[test]
fn test_logout_clears_session() {
    let dir = TempDir::new().unwrap();
    {
        let store = SessionStore::new_with_path(common::store_path(&dir)).unwrap();
        store.set(keys::DISCORD_TOKEN, "secret-token").unwrap();
        store.set(keys::USER_DATA, &common::user_body(0)).unwrap();
    }

    velrath(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    let store = SessionStore::new_with_path(common::store_path(&dir)).unwrap();
    assert!(!store.contains(keys::DISCORD_TOKEN));
    assert!(!store.contains(keys::USER_DATA));
}

#[test]
fn test_login_with_blank_token_fails() {
    let dir = TempDir::new().unwrap();
    velrath(&dir)
        .args(["login", "--token", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a Discord token"));
}

#[test]
fn test_invalid_api_base_is_rejected() {
    let (config_dir, config_path) =
        common::temp_config_file("discord:\n  api_base: ftp://discord.example\n");

    let mut cmd = Command::cargo_bin("velrath").unwrap();
    cmd.env_remove("VELRATH_API_BASE")
        .arg("--config")
        .arg(config_path)
        .arg("--store-path")
        .arg(common::store_path(&config_dir))
        .arg("status");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must use http or https"));
}

#[test]
fn test_zero_timer_is_rejected() {
    let (config_dir, config_path) = common::temp_config_file("ui:\n  error_clear_ms: 0\n");

    let mut cmd = Command::cargo_bin("velrath").unwrap();
    cmd.arg("--config")
        .arg(config_path)
        .arg("--store-path")
        .arg(common::store_path(&config_dir))
        .arg("status");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ui.error_clear_ms"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_remember_then_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::user_body(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/@me/guilds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::guilds_body(2)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    velrath(&dir)
        .env("VELRATH_API_BASE", server.uri())
        .args(["login", "--token", "good-token", "--remember"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as nelly#1337"));

    let store = SessionStore::new_with_path(common::store_path(&dir)).unwrap();
    assert_eq!(
        store.get::<String>(keys::DISCORD_TOKEN).as_deref(),
        Some("good-token")
    );

    velrath(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nitro"))
        .stdout(predicate::str::contains("Servers:      2"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("velrath").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("velrath"));
}
