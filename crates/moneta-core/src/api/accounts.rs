use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{Account, ListResponse, NewAccount};

const ACCOUNTS_PATH: &str = "/contas/";

fn account_path(id: i64) -> String {
    format!("{}{}/", ACCOUNTS_PATH, id)
}

impl ApiClient {
    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let list: ListResponse<Account> = self.get_json(ACCOUNTS_PATH).await?;
        Ok(list.into_vec())
    }

    pub async fn create_account(&self, account: &NewAccount) -> Result<Account, ApiError> {
        account.validate().map_err(ApiError::Validation)?;
        self.send_json(Method::POST, ACCOUNTS_PATH, account).await
    }

    pub async fn update_account(&self, id: i64, account: &NewAccount) -> Result<Account, ApiError> {
        account.validate().map_err(ApiError::Validation)?;
        self.send_json(Method::PUT, &account_path(id), account).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &account_path(id)).await
    }
}
