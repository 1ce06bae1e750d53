use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use velrath::config::{Config, DiscordConfig};
use velrath::storage::SessionStore;

/// A `/users/@me` body with fields the client does not model
#[allow(dead_code)]
pub fn user_body(premium_type: i64) -> serde_json::Value {
    serde_json::json!({
        "id": "80351110224678912",
        "username": "nelly",
        "discriminator": "1337",
        "global_name": "Nelly",
        "avatar": "8342729096ea3675442027381ff50dfe",
        "premium_type": premium_type,
        "mfa_enabled": true,
        "locale": "en-US",
        "flags": 64
    })
}

/// A `/users/@me/guilds` body with `count` entries
#[allow(dead_code)]
pub fn guilds_body(count: usize) -> serde_json::Value {
    serde_json::Value::Array(
        (0..count)
            .map(|i| serde_json::json!({"id": format!("{}", 1000 + i), "name": format!("guild {}", i)}))
            .collect(),
    )
}

/// Client configuration pointing at a mock server
#[allow(dead_code)]
pub fn discord_config(api_base: &str) -> DiscordConfig {
    DiscordConfig {
        api_base: api_base.to_string(),
        timeout_seconds: Some(5),
        ..Default::default()
    }
}

/// Full configuration with the API at `api_base` and the store in `dir`
#[allow(dead_code)]
pub fn test_config(api_base: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.discord = discord_config(api_base);
    config.session.store_path = Some(store_path(dir).to_string_lossy().to_string());
    config
}

#[allow(dead_code)]
pub fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("session.json")
}

#[allow(dead_code)]
pub fn create_temp_store() -> (SessionStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SessionStore::new_with_path(store_path(&tmp)).expect("failed to open session store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
