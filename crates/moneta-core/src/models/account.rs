use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount::{deserialize_amount, deserialize_optional_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    #[serde(rename = "dinheiro")]
    Cash,
    #[serde(rename = "conta_corrente")]
    Checking,
    #[serde(rename = "poupanca")]
    Savings,
    #[serde(rename = "cartao_credito")]
    CreditCard,
    #[serde(rename = "cartao_debito")]
    DebitCard,
    #[serde(rename = "investimento")]
    Investment,
    #[serde(rename = "outro")]
    Other,
}

impl AccountKind {
    pub const ALL: [AccountKind; 7] = [
        AccountKind::Cash,
        AccountKind::Checking,
        AccountKind::Savings,
        AccountKind::CreditCard,
        AccountKind::DebitCard,
        AccountKind::Investment,
        AccountKind::Other,
    ];

    /// Wire value
    pub fn code(&self) -> &'static str {
        match self {
            AccountKind::Cash => "dinheiro",
            AccountKind::Checking => "conta_corrente",
            AccountKind::Savings => "poupanca",
            AccountKind::CreditCard => "cartao_credito",
            AccountKind::DebitCard => "cartao_debito",
            AccountKind::Investment => "investimento",
            AccountKind::Other => "outro",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AccountKind::Cash => "Dinheiro",
            AccountKind::Checking => "Conta Corrente",
            AccountKind::Savings => "Poupança",
            AccountKind::CreditCard => "Cartão de Crédito",
            AccountKind::DebitCard => "Cartão de Débito",
            AccountKind::Investment => "Investimento",
            AccountKind::Other => "Outro",
        }
    }

    /// Icon the web client shows for a new account of this kind
    pub fn default_icon(&self) -> &'static str {
        match self {
            AccountKind::Cash => "wallet",
            AccountKind::Checking => "account_balance",
            AccountKind::Savings => "savings",
            AccountKind::CreditCard | AccountKind::DebitCard => "credit_card",
            AccountKind::Investment => "trending_up",
            AccountKind::Other => "payments",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        AccountKind::ALL
            .into_iter()
            .find(|k| k.code() == wanted)
            .or(match wanted.as_str() {
                "cash" => Some(AccountKind::Cash),
                "checking" => Some(AccountKind::Checking),
                "savings" => Some(AccountKind::Savings),
                "credit_card" => Some(AccountKind::CreditCard),
                "debit_card" => Some(AccountKind::DebitCard),
                "investment" => Some(AccountKind::Investment),
                "other" => Some(AccountKind::Other),
                _ => None,
            })
            .ok_or_else(|| format!("Unknown account kind: {}", s))
    }
}

/// An account as returned by the backend. The list endpoint omits the
/// opening balance and creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: AccountKind,
    #[serde(rename = "saldo_inicial", default, deserialize_with = "deserialize_optional_amount")]
    pub opening_balance: Option<f64>,
    #[serde(rename = "saldo_atual", deserialize_with = "deserialize_amount")]
    pub balance: f64,
    #[serde(rename = "icone", default)]
    pub icon: Option<String>,
    #[serde(rename = "cor", default)]
    pub color: Option<String>,
    #[serde(rename = "ativa", default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Sum of the current balance of every account
pub fn total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|a| a.balance).sum()
}

/// Body for creating or updating an account
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: AccountKind,
    #[serde(rename = "saldo_inicial")]
    pub opening_balance: f64,
    #[serde(rename = "icone", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "cor", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "ativa", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, kind: AccountKind, opening_balance: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            opening_balance,
            icon: Some(kind.default_icon().to_string()),
            color: None,
            active: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Account name is required".to_string());
        }
        if name.chars().count() > 100 {
            return Err("Account name must be at most 100 characters".to_string());
        }
        if let Some(ref color) = self.color {
            let valid = color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err(format!("Invalid color: {}", color));
            }
        }
        Ok(())
    }
}
