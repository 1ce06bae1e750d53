//! Session store
//!
//! A process-wide key/value store backed by a single JSON file. Every value
//! is serialized to its own JSON string before it is kept, mirroring browser
//! local storage: a value that no longer decodes reads as absent instead of
//! poisoning the whole store.

use crate::error::{Result, VelrathError};
use anyhow::Context;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub mod types;
pub use types::{keys, StoredSession};

type Entries = BTreeMap<String, String>;

/// Key/value persistence for the session
///
/// `set` is last-write-wins and is flushed to disk before it returns.
/// `get` never fails: absent keys, undecodable values and type mismatches
/// all read as `None`.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    entries: Mutex<Entries>,
}

impl SessionStore {
    /// Open the store in the user's data directory
    ///
    /// The `VELRATH_SESSION_STORE` environment variable overrides the
    /// location, which is handy for pointing the binary at a scratch file.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("VELRATH_SESSION_STORE") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "velrath", "velrath")
            .ok_or_else(|| VelrathError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("session.json"))
    }

    /// Open the store backed by the given file
    ///
    /// The parent directory is created when missing. A file that cannot be
    /// decoded is logged and treated as an empty store; it is replaced on
    /// the next write.
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::storage::SessionStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SessionStore::new_with_path(dir.path().join("session.json")).unwrap();
    /// assert!(store.get::<String>("discord_token").is_none());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for session store")
                .map_err(|e| VelrathError::Storage(e.to_string()))?;
        }

        let entries = load_entries(&path);
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened session store");

        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Entries::new()),
        }
    }

    /// Location of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store a value under `key`, replacing any previous value
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize value for {}", key))?;

        let mut entries = self.lock();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), encoded);
        // Memory only changes once the file has
        self.flush(&updated)?;
        *entries = updated;
        tracing::debug!(key, "Session value stored");
        Ok(())
    }

    /// Read the value under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.lock();
        let raw = entries.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, "Ignoring undecodable session value: {}", e);
                None
            }
        }
    }

    /// Whether any value is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Remove the value under `key`; removing an absent key is a no-op
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.flush(&updated)?;
        *entries = updated;
        tracing::debug!(key, "Session value removed");
        Ok(())
    }

    /// Drop the stored credential and profile
    pub fn clear_session(&self) -> Result<()> {
        self.remove(keys::DISCORD_TOKEN)?;
        self.remove(keys::USER_DATA)?;
        Ok(())
    }

    /// Snapshot of the well-known session keys
    pub fn snapshot(&self) -> StoredSession {
        StoredSession {
            token_stored: self.contains(keys::DISCORD_TOKEN),
            remember_token: self.get(keys::REMEMBER_TOKEN).unwrap_or(false),
            user: self.get(keys::USER_DATA),
            discoverable: self.get(keys::DISCOVERABLE).unwrap_or(false),
            private_mode: self.get(keys::PRIVATE_MODE).unwrap_or(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, entries: &Entries) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(entries)
            .context("Failed to serialize session store")
            .map_err(|e| VelrathError::Storage(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .context("Failed to write session store")
            .map_err(|e| VelrathError::Storage(e.to_string()))?;
        std::fs::rename(&tmp_path, path)
            .context("Failed to replace session store")
            .map_err(|e| VelrathError::Storage(e.to_string()))?;

        Ok(())
    }
}

fn load_entries(path: &Path) -> Entries {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read session store: {}", e);
            return Entries::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Session store is corrupt, starting empty: {}", e);
            Entries::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::UserProfile;
    use serde_json::json;
    use crate::test_utils::{block_store_writes, temp_store};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_get_absent_key_is_none() {
        let store = SessionStore::in_memory();
        assert!(store.get::<String>(keys::DISCORD_TOKEN).is_none());
    }

    #[test]
    fn test_set_is_last_write_wins() {
        let store = SessionStore::in_memory();
        store.set(keys::DISCORD_TOKEN, "first").unwrap();
        store.set(keys::DISCORD_TOKEN, "second").unwrap();
        assert_eq!(
            store.get::<String>(keys::DISCORD_TOKEN).as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let (store, _dir) = temp_store();
        store.remove(keys::USER_DATA).unwrap();
        assert!(!store.contains(keys::USER_DATA));
    }

    #[test]
    fn test_values_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        {
            let store = SessionStore::new_with_path(&path).unwrap();
            store.set(keys::REMEMBER_TOKEN, &true).unwrap();
            store
                .set(keys::USER_DATA, &json!({"id": "1", "username": "ava"}))
                .unwrap();
        }

        let reopened = SessionStore::new_with_path(&path).unwrap();
        assert_eq!(reopened.get::<bool>(keys::REMEMBER_TOKEN), Some(true));
        let profile: UserProfile = reopened.get(keys::USER_DATA).unwrap();
        assert_eq!(profile.username, "ava");
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"user_data": "{not json", "remember_token": "true"}"#,
        )
        .unwrap();

        let store = SessionStore::new_with_path(&path).unwrap();
        assert!(store.get::<serde_json::Value>(keys::USER_DATA).is_none());
        assert_eq!(store.get::<bool>(keys::REMEMBER_TOKEN), Some(true));
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let store = SessionStore::in_memory();
        store.set(keys::PRIVATE_MODE, "yes").unwrap();
        assert!(store.get::<bool>(keys::PRIVATE_MODE).is_none());
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = SessionStore::new_with_path(&path).unwrap();
        assert!(!store.contains(keys::DISCORD_TOKEN));

        store.set(keys::DISCORD_TOKEN, "abc").unwrap();
        let reopened = SessionStore::new_with_path(&path).unwrap();
        assert_eq!(
            reopened.get::<String>(keys::DISCORD_TOKEN).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_clear_session_keeps_preferences() {
        let (store, _dir) = temp_store();
        store.set(keys::DISCORD_TOKEN, "abc").unwrap();
        store.set(keys::USER_DATA, &json!({"id": "1"})).unwrap();
        store.set(keys::DISCOVERABLE, &true).unwrap();

        store.clear_session().unwrap();

        assert!(!store.contains(keys::DISCORD_TOKEN));
        assert!(!store.contains(keys::USER_DATA));
        assert_eq!(store.get::<bool>(keys::DISCOVERABLE), Some(true));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let (store, dir) = temp_store();
        store.set(keys::DISCOVERABLE, &false).unwrap();
        store.set(keys::DISCORD_TOKEN, "abc").unwrap();
        block_store_writes(&store);

        assert!(store.set(keys::DISCOVERABLE, &true).is_err());
        assert!(store.remove(keys::DISCORD_TOKEN).is_err());

        assert_eq!(store.get::<bool>(keys::DISCOVERABLE), Some(false));
        assert!(store.contains(keys::DISCORD_TOKEN));

        let on_disk = SessionStore::new_with_path(dir.path().join("session.json")).unwrap();
        assert_eq!(on_disk.get::<bool>(keys::DISCOVERABLE), Some(false));
        assert!(on_disk.contains(keys::DISCORD_TOKEN));
    }

    #[test]
    fn test_snapshot_defaults() {
        let snapshot = SessionStore::in_memory().snapshot();
        assert!(!snapshot.token_stored);
        assert!(!snapshot.remember_token);
        assert!(snapshot.user.is_none());
    }

    #[test]
    #[serial]
    fn test_new_honors_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("override.json");
        std::env::set_var("VELRATH_SESSION_STORE", &path);

        let store = SessionStore::new().unwrap();
        store.set(keys::PRIVATE_MODE, &true).unwrap();

        std::env::remove_var("VELRATH_SESSION_STORE");

        assert_eq!(store.path(), Some(path.as_path()));
        assert!(path.exists());
    }
}
