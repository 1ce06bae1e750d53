//! Test utilities for Velrath
//!
//! Sample identity records, temporary session stores, and assertion helpers
//! shared by the unit tests.

use crate::discord::UserProfile;
use crate::storage::{keys, SessionStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A profile as the identity API returns it, with the guild count filled in
pub fn sample_profile(premium_type: i64) -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "id": "1234",
        "username": "ava",
        "discriminator": "0420",
        "avatar": null,
        "premium_type": premium_type,
        "guild_count": 12,
        "locale": "en-US"
    }))
    .expect("sample profile should deserialize")
}

/// An in-memory store holding a credential and a profile
pub fn store_with_session(premium_type: i64) -> Arc<SessionStore> {
    let store = Arc::new(SessionStore::in_memory());
    store
        .set(keys::DISCORD_TOKEN, "abc123")
        .expect("in-memory set cannot fail");
    store
        .set(keys::USER_DATA, &sample_profile(premium_type))
        .expect("in-memory set cannot fail");
    store
}

/// A file-backed store in a fresh temporary directory
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn temp_store() -> (SessionStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store = SessionStore::new_with_path(dir.path().join("session.json"))
        .expect("Failed to open session store");
    (store, dir)
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the error message doesn't contain the expected text
pub fn assert_error_contains(err: &anyhow::Error, expected: &str) {
    let message = format!("{:#}", err);
    assert!(
        message.contains(expected),
        "Expected error to contain '{}', but got: {}",
        expected,
        message
    );
}

/// Make every later write to a file-backed store fail
///
/// Occupies the store's temporary file name with a directory, so the
/// write before the rename errors out.
pub fn block_store_writes(store: &SessionStore) {
    let path = store.path().expect("store should be file-backed");
    std::fs::create_dir(path.with_extension("json.tmp"))
        .expect("Failed to block session store writes");
}
