use thiserror::Error;

use crate::auth::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in - please log in again")]
    LoggedOut,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Invalid data: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::Validation(Self::describe_validation(body)),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(Self::detail(body)),
            404 => ApiError::NotFound(Self::detail(body)),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, Self::truncate_body(body))),
        }
    }

    /// True when the error means the session is gone and the user must log in
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::LoggedOut | ApiError::Unauthorized)
    }

    /// The backend's `{"detail": "..."}` message, or the truncated body
    pub(crate) fn detail(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or_else(|| Self::truncate_body(body))
    }

    /// Flatten a field-error payload such as
    /// `{"email": ["Enter a valid email."], "non_field_errors": ["..."]}`
    /// into `email: Enter a valid email.; ...`.
    fn describe_validation(body: &str) -> String {
        let value = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value,
            Err(_) => return Self::truncate_body(body),
        };

        let fields = match value {
            serde_json::Value::Object(fields) => fields,
            serde_json::Value::Array(items) => {
                return items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
            }
            other => return other.to_string(),
        };

        let mut parts = Vec::new();
        for (field, messages) in &fields {
            let text = match messages {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                    .collect::<Vec<_>>()
                    .join(" "),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if field == "non_field_errors" || field == "detail" {
                parts.push(text);
            } else {
                parts.push(format!("{}: {}", field, text));
            }
        }
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(ApiError::from_status(StatusCode::BAD_GATEWAY, "x"), ApiError::ServerError(_)));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "x"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_not_found_uses_detail() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#);
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Not found."),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validation_flattens_field_errors() {
        let body = r#"{"email":["Enter a valid email address."],"non_field_errors":["As senhas não conferem."]}"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::Validation(msg) => {
                assert!(msg.contains("email: Enter a valid email address."));
                assert!(msg.contains("As senhas não conferem."));
                assert!(!msg.contains("non_field_errors"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validation_list_payload() {
        let body = r#"["Transferência precisa de conta de destino."]"#;
        match ApiError::from_status(StatusCode::BAD_REQUEST, body) {
            ApiError::Validation(msg) => assert_eq!(msg, "Transferência precisa de conta de destino."),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_is_auth_error() {
        assert!(ApiError::LoggedOut.is_auth_error());
        assert!(ApiError::Unauthorized.is_auth_error());
        assert!(!ApiError::RateLimited.is_auth_error());
    }
}
