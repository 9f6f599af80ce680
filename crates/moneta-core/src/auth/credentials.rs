use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::session::{SessionState, TokenPair};
use super::storage::{MemoryStorage, Storage, StorageError};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Sole owner of the current token pair.
///
/// Everything else reads tokens through this store and keeps a copy only for
/// the lifetime of one request. Writes are serialized so a pair is never
/// observed half-written by another writer.
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Overwrite both tokens. No validation of their shape.
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        self.storage
            .set_many(&[(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)])?;
        debug!("Token pair stored");
        Ok(())
    }

    /// Replace the access token and keep the refresh token as is
    pub fn replace_access_token(&self, access: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        debug!("Access token replaced");
        Ok(())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Both tokens, if both are present
    pub fn token_pair(&self) -> Option<TokenPair> {
        Some(TokenPair::new(self.access_token()?, self.refresh_token()?))
    }

    /// Remove both tokens. Returns whether anything was removed, so callers
    /// can tell the first logout apart from repeats.
    pub fn clear_tokens(&self) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let removed = self
            .storage
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])?;
        if removed {
            debug!("Token pair cleared");
        }
        Ok(removed)
    }

    /// Presence check only. Expiry is the backend's call.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn session_state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read token storage");
                None
            }
        }
    }
}
