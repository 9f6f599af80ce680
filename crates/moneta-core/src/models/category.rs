use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "receita")]
    Income,
    #[serde(rename = "despesa")]
    Expense,
}

impl CategoryKind {
    pub fn code(&self) -> &'static str {
        match self {
            CategoryKind::Income => "receita",
            CategoryKind::Expense => "despesa",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Income => write!(f, "Receita"),
            CategoryKind::Expense => write!(f, "Despesa"),
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receita" | "income" => Ok(CategoryKind::Income),
            "despesa" | "expense" => Ok(CategoryKind::Expense),
            _ => Err(format!("Unknown category kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: CategoryKind,
    #[serde(rename = "icone", default)]
    pub icon: Option<String>,
    #[serde(rename = "cor", default)]
    pub color: Option<String>,
    /// System default shared by every user
    #[serde(rename = "padrao", default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: CategoryKind,
    #[serde(rename = "icone", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "cor", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            icon: None,
            color: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Category name is required".to_string());
        }
        Ok(())
    }
}
