//! Authenticated API client for the moneta backend.
//!
//! Every call to a protected resource goes through `ApiClient::request`,
//! which attaches the bearer token, renews it once on a 401 and retries the
//! request once with the new token. When renewal fails the stored tokens are
//! cleared, the `Navigator` is told to go to the login screen, and the call
//! resolves to `None`.
//!
//! Typed helpers (`get_json`, `send_json`, `send_empty`) sit on top of
//! `request` and turn statuses into `ApiError`s for the resource modules.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::ApiError;
use crate::auth::renewal::{self, RecoveryAction, ResponseAction};
use crate::auth::{CredentialStore, Navigator, Renewer};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// A timed-out request is a network failure and never triggers renewal.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path of the token refresh endpoint, relative to the API base URL
const REFRESH_PATH: &str = "/token/refresh/";

/// Method, headers and body of one request. Headers set here win over the
/// default JSON content type.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// API client for the moneta backend.
/// Clone is cheap - all state is behind `Arc`, and reqwest::Client shares
/// its connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    credentials: Arc<CredentialStore>,
    renewer: Arc<Renewer>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(
        base_url: &str,
        credentials: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Self::with_timeout(
            base_url,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            credentials,
            navigator,
        )
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url: Arc<str> = Arc::from(base_url.trim_end_matches('/'));
        let renewer = Renewer::new(
            client.clone(),
            format!("{}{}", base_url, REFRESH_PATH),
            Arc::clone(&credentials),
        );

        Ok(Self {
            client,
            base_url,
            credentials,
            renewer: Arc::new(renewer),
            navigator,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn renewer(&self) -> &Renewer {
        &self.renewer
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request to a protected resource.
    ///
    /// - `Ok(Some(response))`: the backend answered. Any status other than an
    ///   unrecovered 401 comes back untouched, body unread.
    /// - `Ok(None)`: the session is gone. Tokens were cleared and the
    ///   navigator was invoked; there is no body to read.
    /// - `Err(ApiError::NetworkError)`: the transport failed or timed out.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Response>, ApiError> {
        let url = self.url(path);
        let token = self.credentials.access_token();

        let response = self.send(&url, &options, token.as_deref()).await?;

        let rejected = match (renewal::on_response(response.status(), token.is_some()), token) {
            (ResponseAction::Renew, Some(rejected)) => rejected,
            _ => return Ok(Some(response)),
        };

        debug!(url = %url, "Access token rejected, renewing");
        match renewal::on_renewal(self.renewer.renew(&rejected).await) {
            RecoveryAction::Retry(access) => {
                let retried = self.send(&url, &options, Some(&access)).await?;
                debug!(url = %url, status = %retried.status(), "Retried after renewal");
                Ok(Some(retried))
            }
            RecoveryAction::LogOut => {
                if self.end_session().is_err() {
                    debug!(url = %url, "Session ended with tokens still stored");
                }
                Ok(None)
            }
        }
    }

    /// Clear the tokens and send the user to login. Concurrent failures all
    /// land here; only the one that actually removed tokens navigates.
    ///
    /// The redirect happens even when the store cannot be cleared; the
    /// storage error is returned afterwards.
    pub(crate) fn end_session(&self) -> Result<(), ApiError> {
        let cleared = self.credentials.clear_tokens();
        let redirect = match cleared {
            Ok(removed) => removed,
            Err(ref e) => {
                warn!(error = %e, "Failed to clear stored tokens");
                true
            }
        };
        if redirect {
            info!("Session ended, redirecting to login");
            self.navigator.redirect_to_login();
        }
        cleared.map(|_| ()).map_err(ApiError::from)
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers.clone());

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(ref body) = options.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        debug!(
            method = %options.method,
            url = url,
            status = %response.status(),
            authenticated = token.is_some(),
            "API request"
        );
        Ok(response)
    }

    /// Send a request that needs no session (login, registration).
    pub(crate) async fn send_public<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let response = self.client.request(method, &url).json(body).send().await?;
        debug!(url = %url, status = %response.status(), "Public API request");
        Ok(response)
    }

    /// Map a gateway result to a successful response or an `ApiError`.
    async fn check_response(response: Option<Response>) -> Result<Response, ApiError> {
        let response = response.ok_or(ApiError::LoggedOut)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = Self::check_response(self.request(path, RequestOptions::get()).await?).await?;
        Self::parse_json(response, path).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::new(method).json(body)?;
        let response = Self::check_response(self.request(path, options).await?).await?;
        Self::parse_json(response, path).await
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        Self::check_response(self.request(path, RequestOptions::new(method)).await?).await?;
        Ok(())
    }
}
