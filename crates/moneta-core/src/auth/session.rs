use std::fmt;

use serde::{Deserialize, Serialize};

/// Access/refresh token pair as returned by the login endpoint.
///
/// Both values are opaque. The pair *is* the session: there is no other
/// session record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens never end up in logs
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body returned by the refresh endpoint. The backend does not rotate
/// refresh tokens, so only the access token comes back.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Derived view of the credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        self == SessionState::Authenticated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Authenticated => write!(f, "logged in"),
            SessionState::Anonymous => write!(f, "logged out"),
        }
    }
}
