use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum password length the backend accepts on registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "Gratuito"),
            Plan::Pro => write!(f, "PRO"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "foto_perfil", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "plano")]
    pub plan: Plan,
    /// Computed by the backend from the plan and its expiry
    #[serde(default)]
    pub is_pro: bool,
    #[serde(rename = "data_expiracao_pro", default)]
    pub pro_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(rename = "notificacoes_ativas", default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// First name if set, otherwise the username
    pub fn display_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }
}

/// Registration form
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if !self.email.contains('@') {
            return Err("A valid e-mail is required".to_string());
        }
        if self.password != self.password_confirm {
            return Err("Passwords do not match".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        Ok(())
    }
}

/// What the registration endpoint returns: the form minus the passwords
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Preference update; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(rename = "notificacoes_ativas", skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Preferences {
    pub fn is_empty(&self) -> bool {
        self.dark_mode.is_none() && self.notifications_enabled.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(password: &str, confirm: &str) -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: String::new(),
            password: password.into(),
            password_confirm: confirm.into(),
        }
    }

    #[test]
    fn test_parse_user() {
        let json = r#"{"id":1,"username":"alice","email":"a@x.com","first_name":"","last_name":"","telefone":"",
            "foto_perfil":null,"plano":"pro","is_pro":true,"data_expiracao_pro":"2030-01-01T00:00:00Z",
            "dark_mode":true,"notificacoes_ativas":false,"date_joined":"2024-01-01T00:00:00-03:00"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.plan, Plan::Pro);
        assert!(user.is_pro);
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn test_registration_validation() {
        assert!(new_user("secret123", "secret123").validate().is_ok());
        assert_eq!(
            new_user("secret123", "secret124").validate().unwrap_err(),
            "Passwords do not match"
        );
        assert!(new_user("short", "short").validate().is_err());
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let rendered = format!("{:?}", new_user("hunter2hunter2", "hunter2hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_preferences_only_sends_set_fields() {
        let prefs = Preferences {
            dark_mode: Some(true),
            ..Preferences::default()
        };
        assert!(!prefs.is_empty());
        assert_eq!(serde_json::to_string(&prefs).unwrap(), r#"{"dark_mode":true}"#);
        assert!(Preferences::default().is_empty());
    }
}
