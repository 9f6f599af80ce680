//! REST API client module for the moneta backend.
//!
//! `ApiClient` is the single gateway to protected resources: it attaches
//! the bearer token, renews it transparently on a 401, and ends the session
//! when renewal fails. The resource modules add typed operations on top:
//!
//! - `auth`: login, registration, logout, current user, preferences
//! - `accounts`: list/create/update/delete accounts
//! - `categories`: list/create categories
//! - `transactions`: filtered listing, create/delete, monthly summary

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod client;
pub mod error;
pub mod transactions;

pub use client::{ApiClient, RequestOptions, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
