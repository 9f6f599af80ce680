//! Authentication module for managing tokens and session state.
//!
//! This module provides:
//! - `CredentialStore`: owner of the current access/refresh token pair
//! - `Storage`: the durable key-value substrate behind the store
//!   (in-memory, JSON file, or OS keychain)
//! - `Renewer`: exchanges the refresh token for a new access token,
//!   serialized so concurrent callers share a single renewal
//! - `Navigator`: the capability invoked when the session is lost
//!
//! Tokens are opaque. Nothing here decodes or validates them; the backend
//! is the only authority on expiry.

pub mod credentials;
pub mod navigator;
pub mod renewal;
pub mod session;
pub mod storage;

pub use credentials::CredentialStore;
pub use navigator::{Navigator, NoopNavigator};
pub use renewal::{RecoveryAction, RenewalOutcome, RenewalState, Renewer, ResponseAction};
pub use session::{RefreshResponse, SessionState, TokenPair};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, Storage, StorageError};
