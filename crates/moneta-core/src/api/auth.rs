//! Session endpoints: login, registration, logout and the current user.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, warn};

use super::{ApiClient, ApiError};
use crate::auth::session::LoginRequest;
use crate::auth::TokenPair;
use crate::models::{NewUser, Preferences, RegisteredUser, User};

const LOGIN_PATH: &str = "/token/";
const USERS_PATH: &str = "/usuarios/";
const ME_PATH: &str = "/usuarios/me/";
const PREFERENCES_PATH: &str = "/usuarios/update_preferences/";

/// Shown when the backend rejects a login without saying why
const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a token pair and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::LoginFailed("Username and password required".to_string()));
        }

        let response = self
            .send_public(Method::POST, LOGIN_PATH, &LoginRequest { username, password })
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Login rejected");
            if status.is_server_error() {
                return Err(ApiError::from_status(status, &body));
            }
            let detail = serde_json::from_str::<ErrorDetail>(&body)
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
            return Err(ApiError::LoginFailed(detail));
        }

        let pair: TokenPair = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed login response: {}", e)))?;
        self.credentials().set_tokens(&pair.access, &pair.refresh)?;
        info!(username = username, "Login successful");
        Ok(pair)
    }

    /// Create a user. Does not log in; the caller logs in afterwards.
    pub async fn register(&self, user: &NewUser) -> Result<RegisteredUser, ApiError> {
        user.validate().map_err(ApiError::Validation)?;

        let response = self.send_public(Method::POST, USERS_PATH, user).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let created: RegisteredUser = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed registration response: {}", e)))?;
        info!(username = %created.username, "Account registered");
        Ok(created)
    }

    /// Drop the session and send the user to login
    pub fn logout(&self) -> Result<(), ApiError> {
        self.end_session()
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_json(ME_PATH).await
    }

    pub async fn update_preferences(&self, preferences: &Preferences) -> Result<User, ApiError> {
        self.send_json(Method::PATCH, PREFERENCES_PATH, preferences).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        json!({
            "id": 1, "username": "alice", "email": "alice@example.com",
            "first_name": "Alice", "last_name": "", "telefone": "",
            "foto_perfil": null, "plano": "free", "is_pro": false,
            "data_expiracao_pro": null, "dark_mode": false,
            "notificacoes_ativas": true, "date_joined": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_login_stores_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .and(body_json(json!({ "username": "alice", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A1", "refresh": "R1" })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        let pair = client.login("alice", "secret1").await.unwrap();

        assert_eq!(pair, TokenPair::new("A1", "R1"));
        assert_eq!(credentials.access_token().as_deref(), Some("A1"));
        assert_eq!(credentials.refresh_token().as_deref(), Some("R1"));
        assert!(credentials.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        match client.login("alice", "wrong").await.unwrap_err() {
            ApiError::LoginFailed(msg) => {
                assert_eq!(msg, "No active account found with the given credentials")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!credentials.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_without_detail_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "password": ["required"] })))
            .mount(&server)
            .await;

        let (client, _, _) = client_for(&server);
        match client.login("alice", "x").await.unwrap_err() {
            ApiError::LoginFailed(msg) => assert_eq!(msg, DEFAULT_LOGIN_ERROR),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_does_not_send_stale_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A9", "refresh": "R9" })))
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("OLD", "OLDR").unwrap();
        client.login("alice", "secret1").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
        assert_eq!(credentials.access_token().as_deref(), Some("A9"));
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/usuarios/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(user_json()))
            .expect(0)
            .mount(&server)
            .await;

        let (client, _, _) = client_for(&server);
        let user = NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            password: "secret123".into(),
            password_confirm: "different".into(),
        };
        assert!(matches!(client.register(&user).await, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_reports_field_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/usuarios/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "username": ["A user with that username already exists."]
            })))
            .mount(&server)
            .await;

        let (client, _, _) = client_for(&server);
        let user = NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            password: "secret123".into(),
            password_confirm: "secret123".into(),
        };
        match client.register(&user).await.unwrap_err() {
            ApiError::Validation(msg) => assert!(msg.starts_with("username:")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_returns_created_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/usuarios/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "username": "alice", "email": "alice@example.com",
                "first_name": "Alice", "last_name": ""
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        let user = NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            password: "secret123".into(),
            password_confirm: "secret123".into(),
        };
        let created = client.register(&user).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.first_name, "Alice");
        assert!(!credentials.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_and_redirects_once() {
        let server = MockServer::start().await;
        let (client, credentials, navigator) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        client.logout().unwrap();
        client.logout().unwrap();

        assert!(!credentials.is_authenticated());
        assert_eq!(navigator.count(), 1);
    }

    #[tokio::test]
    async fn test_me_and_preferences() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/usuarios/me/"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .mount(&server)
            .await;
        let mut updated = user_json();
        updated["dark_mode"] = json!(true);
        Mock::given(method("PATCH"))
            .and(path("/usuarios/update_preferences/"))
            .and(body_json(json!({ "dark_mode": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(updated))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = client_for(&server);
        credentials.set_tokens("A1", "R1").unwrap();

        let me = client.me().await.unwrap();
        assert_eq!(me.display_name(), "Alice");

        let prefs = Preferences {
            dark_mode: Some(true),
            ..Preferences::default()
        };
        assert!(client.update_preferences(&prefs).await.unwrap().dark_mode);
    }
}
