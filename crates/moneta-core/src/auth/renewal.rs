//! Access token renewal.
//!
//! A renewal exchanges the stored refresh token for a new access token at
//! `POST /token/refresh/`. The protocol moves `Idle -> Renewing ->
//! {Renewed, Failed}` and never retries on its own; the API client decides
//! what happens after `Failed`.
//!
//! Renewals are serialized. A caller that got a 401 for a token that has
//! since been replaced adopts the current token without touching the
//! network, and a caller that arrives after a failed renewal (store already
//! cleared, or its token is the one a renewal just failed for) fails without
//! a network call. Concurrent 401s therefore cost a single refresh request.
//!
//! The decision functions `on_response` and `on_renewal` are pure so the
//! retry policy can be tested without a server.

use std::sync::{Arc, Mutex};

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use super::credentials::CredentialStore;
use super::session::{RefreshRequest, RefreshResponse};
use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalState {
    Idle,
    Renewing,
    Renewed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Carries the access token to retry with
    Renewed(String),
    Failed,
}

/// What to do with a response from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAction {
    Deliver,
    Renew,
}

/// What to do once a renewal has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    Retry(String),
    LogOut,
}

/// Renewal only makes sense for a 401 on a request that carried a token.
pub fn on_response(status: StatusCode, token_attached: bool) -> ResponseAction {
    if status == StatusCode::UNAUTHORIZED && token_attached {
        ResponseAction::Renew
    } else {
        ResponseAction::Deliver
    }
}

pub fn on_renewal(outcome: RenewalOutcome) -> RecoveryAction {
    match outcome {
        RenewalOutcome::Renewed(access) => RecoveryAction::Retry(access),
        RenewalOutcome::Failed => RecoveryAction::LogOut,
    }
}

pub struct Renewer {
    client: Client,
    refresh_url: String,
    credentials: Arc<CredentialStore>,
    in_flight: AsyncMutex<()>,
    state: Mutex<RenewalState>,
    /// Access token whose renewal last failed
    failed_for: Mutex<Option<String>>,
}

impl Renewer {
    pub fn new(client: Client, refresh_url: String, credentials: Arc<CredentialStore>) -> Self {
        Self {
            client,
            refresh_url,
            credentials,
            in_flight: AsyncMutex::new(()),
            state: Mutex::new(RenewalState::Idle),
            failed_for: Mutex::new(None),
        }
    }

    /// State of the most recent renewal
    pub fn state(&self) -> RenewalState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(RenewalState::Failed)
    }

    /// Renew after `rejected_token` was answered with 401.
    pub async fn renew(&self, rejected_token: &str) -> RenewalOutcome {
        let _in_flight = self.in_flight.lock().await;

        match self.credentials.access_token() {
            Some(current) if current != rejected_token => {
                debug!("Access token already renewed by a concurrent request");
                self.set_state(RenewalState::Renewed);
                return RenewalOutcome::Renewed(current);
            }
            None => {
                debug!("Session already cleared, skipping renewal");
                self.set_state(RenewalState::Failed);
                return RenewalOutcome::Failed;
            }
            Some(_) => {}
        }

        if self.already_failed_for(rejected_token) {
            debug!("Renewal already failed for this token");
            return RenewalOutcome::Failed;
        }

        let Some(refresh) = self.credentials.refresh_token() else {
            warn!("No refresh token stored, cannot renew");
            return self.fail(rejected_token);
        };

        self.set_state(RenewalState::Renewing);
        let access = match self.exchange(&refresh).await {
            Ok(access) => access,
            Err(e) => {
                warn!(error = %e, "Token renewal failed");
                return self.fail(rejected_token);
            }
        };

        if let Err(e) = self.credentials.replace_access_token(&access) {
            warn!(error = %e, "Failed to store renewed access token");
            return self.fail(rejected_token);
        }

        info!("Access token renewed");
        self.set_state(RenewalState::Renewed);
        RenewalOutcome::Renewed(access)
    }

    async fn exchange(&self, refresh: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed refresh response: {}", e)))?;

        if body.access.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Refresh response carried an empty access token".to_string(),
            ));
        }
        Ok(body.access)
    }

    fn fail(&self, rejected_token: &str) -> RenewalOutcome {
        if let Ok(mut failed_for) = self.failed_for.lock() {
            *failed_for = Some(rejected_token.to_string());
        }
        self.set_state(RenewalState::Failed);
        RenewalOutcome::Failed
    }

    fn already_failed_for(&self, token: &str) -> bool {
        self.failed_for
            .lock()
            .map(|f| f.as_deref() == Some(token))
            .unwrap_or(false)
    }

    fn set_state(&self, next: RenewalState) {
        if let Ok(mut state) = self.state.lock() {
            debug!(from = ?*state, to = ?next, "Renewal state change");
            *state = next;
        }
    }
}
