use std::path::PathBuf;

use moneta_core::models::{CategoryKind, NewAccount, NewCategory, NewTransaction, Preferences, TransactionFilter};
use moneta_core::TokenStorageKind;

/// Options that apply to every command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token_storage: Option<TokenStorageKind>,
    pub json: bool,
    pub log_dir: Option<PathBuf>,
    pub verbosity: u8,
}

#[derive(Debug, Clone)]
pub enum Action {
    Login {
        username: Option<String>,
    },
    Register {
        username: String,
        email: String,
        first_name: String,
        last_name: String,
    },
    Logout,
    Whoami,
    Status,
    UpdatePreferences(Preferences),
    ListAccounts,
    CreateAccount(NewAccount),
    DeleteAccount {
        id: i64,
    },
    ListCategories {
        kind: Option<CategoryKind>,
    },
    CreateCategory(NewCategory),
    ListTransactions {
        filter: TransactionFilter,
        limit: usize,
    },
    CreateTransaction(NewTransaction),
    DeleteTransaction {
        id: i64,
    },
    Summary {
        month: u32,
        year: i32,
    },
    Dashboard {
        month: u32,
        year: i32,
    },
}

impl Action {
    /// Commands that only work with a stored session
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Action::Login { .. } | Action::Register { .. } | Action::Logout | Action::Status
        )
    }
}
