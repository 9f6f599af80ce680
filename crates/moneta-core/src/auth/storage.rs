//! Key-value substrates for token persistence.
//!
//! Every substrate stores string values under string keys and is
//! synchronous. `set_many` must either write all entries or none, which
//! `FileStorage` guarantees by rewriting its document through a temp file.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Keychain service name used by `KeyringStorage`
const KEYRING_SERVICE: &str = "moneta";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt token file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write all entries. Implementations that can do so atomically must.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove keys, returning true if at least one of them existed.
    fn remove_many(&self, keys: &[&str]) -> Result<bool, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.remove_many(&[key])
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local storage. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<bool, StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        let mut removed = false;
        for key in keys {
            removed |= values.remove(*key).is_some();
        }
        Ok(removed)
    }
}

// ============================================================================
// JSON file
// ============================================================================

/// Stores all keys in a single JSON object on disk.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = values.len(), "Token file written");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.read_all()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        self.write_all(&values)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.read_all()?;
        let mut removed = false;
        for key in keys {
            removed |= values.remove(*key).is_some();
        }
        if removed {
            self.write_all(&values)?;
        }
        Ok(removed)
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// One keychain entry per key under the `moneta` service.
///
/// The keychain has no multi-entry transaction, so `set_many` writes entries
/// in order and stops at the first failure.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.entry(key)?.set_password(value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<bool, StorageError> {
        let mut removed = false;
        for key in keys {
            match self.entry(key)?.delete_credential() {
                Ok(()) => removed = true,
                Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("a").unwrap(), None);

        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));

        assert!(storage.remove("a").unwrap());
        assert!(!storage.remove("a").unwrap());
        assert_eq!(storage.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        FileStorage::new(&path)
            .set_many(&[("access_token", "A1"), ("refresh_token", "R1")])
            .unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get("refresh_token").unwrap().as_deref(), Some("R1"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("tokens.json"));
        assert_eq!(storage.get("access_token").unwrap(), None);
        assert!(!storage.remove_many(&["access_token", "refresh_token"]).unwrap());
    }

    #[test]
    fn test_file_storage_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get("access_token"), Err(StorageError::Format(_))));
    }
}
