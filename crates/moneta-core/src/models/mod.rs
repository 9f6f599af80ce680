//! Data models for the moneta backend.
//!
//! - `Account`: a wallet, bank account, card or investment with its balance
//! - `Category`: income/expense grouping, including system defaults
//! - `Transaction`, `TransactionSummary`: money movements and their list view
//! - `MonthlySummary`: income, expenses and spending per category for a month
//! - `User`: the logged-in user's profile and plan
//!
//! Field names on the wire are the backend's (Portuguese); the Rust side
//! renames them.

pub mod account;
pub mod amount;
pub mod category;
pub mod list;
pub mod summary;
pub mod transaction;
pub mod user;

pub use account::{total_balance, Account, AccountKind, NewAccount};
pub use category::{Category, CategoryKind, NewCategory};
pub use list::ListResponse;
pub use summary::{CategorySpending, MonthlySummary};
pub use transaction::{NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionSummary};
pub use user::{NewUser, Plan, Preferences, RegisteredUser, User};
