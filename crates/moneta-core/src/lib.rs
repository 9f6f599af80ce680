//! Core library for moneta.
//!
//! Provides the authenticated API client for the moneta personal finance
//! backend, durable token storage with transparent renewal, configuration,
//! and the account/category/transaction models the backend exposes.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, RequestOptions};
pub use auth::{CredentialStore, Navigator, TokenPair};
pub use config::{Config, TokenStorageKind};
