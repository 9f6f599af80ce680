//! Command execution against the API.

pub mod finance;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, warn};

use moneta_core::{ApiClient, Config, CredentialStore, TokenStorageKind};

use crate::cli::actions::{Action, GlobalArgs};
use crate::navigator::CliNavigator;

/// Everything a command needs: the configured client and the loaded config
pub struct AppContext {
    pub client: ApiClient,
    pub config: Config,
    /// Token storage in effect, after command-line overrides
    pub storage_kind: TokenStorageKind,
    pub json: bool,
}

impl AppContext {
    pub fn new(globals: &GlobalArgs) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });

        let mut storage_config = config.clone();
        if let Some(kind) = globals.token_storage {
            storage_config.token_storage = kind;
        }
        let storage = storage_config.build_storage()?;

        let base_url = globals.api_url.clone().unwrap_or_else(|| config.api_base_url());
        let timeout = globals
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.request_timeout());
        debug!(base_url = %base_url, storage = %storage_config.token_storage, "Building API client");

        let client = ApiClient::with_timeout(
            &base_url,
            timeout,
            Arc::new(CredentialStore::new(storage)),
            Arc::new(CliNavigator),
        )?;

        Ok(Self {
            client,
            config,
            storage_kind: storage_config.token_storage,
            json: globals.json,
        })
    }

    #[cfg(test)]
    pub fn for_client(client: ApiClient) -> Self {
        Self {
            client,
            config: Config::default(),
            storage_kind: TokenStorageKind::Memory,
            json: false,
        }
    }
}

pub async fn handle(action: Action, ctx: &mut AppContext) -> Result<()> {
    if action.requires_session() && !ctx.client.credentials().is_authenticated() {
        bail!("Not logged in. Run `moneta login` first.");
    }

    match action {
        Action::Login { username } => session::login(ctx, username).await,
        Action::Register {
            username,
            email,
            first_name,
            last_name,
        } => session::register(ctx, username, email, first_name, last_name).await,
        Action::Logout => session::logout(ctx),
        Action::Whoami => session::whoami(ctx).await,
        Action::Status => session::status(ctx),
        Action::UpdatePreferences(preferences) => session::update_preferences(ctx, &preferences).await,
        Action::ListAccounts => finance::list_accounts(ctx).await,
        Action::CreateAccount(account) => finance::create_account(ctx, &account).await,
        Action::DeleteAccount { id } => finance::delete_account(ctx, id).await,
        Action::ListCategories { kind } => finance::list_categories(ctx, kind).await,
        Action::CreateCategory(category) => finance::create_category(ctx, &category).await,
        Action::ListTransactions { filter, limit } => finance::list_transactions(ctx, &filter, limit).await,
        Action::CreateTransaction(transaction) => finance::create_transaction(ctx, &transaction).await,
        Action::DeleteTransaction { id } => finance::delete_transaction(ctx, id).await,
        Action::Summary { month, year } => finance::summary(ctx, month, year).await,
        Action::Dashboard { month, year } => finance::dashboard(ctx, month, year).await,
    }
}
