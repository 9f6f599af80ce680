use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::amount::deserialize_amount;
use super::category::Category;

/// Longest description the backend accepts
const MAX_DESCRIPTION_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "receita")]
    Income,
    #[serde(rename = "despesa")]
    Expense,
    #[serde(rename = "transferencia")]
    Transfer,
}

impl TransactionKind {
    pub fn code(&self) -> &'static str {
        match self {
            TransactionKind::Income => "receita",
            TransactionKind::Expense => "despesa",
            TransactionKind::Transfer => "transferencia",
        }
    }

    /// Sign applied when showing an amount of this kind
    pub fn sign(&self) -> &'static str {
        match self {
            TransactionKind::Income => "+",
            TransactionKind::Expense => "-",
            TransactionKind::Transfer => "",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "Receita"),
            TransactionKind::Expense => write!(f, "Despesa"),
            TransactionKind::Transfer => write!(f, "Transferência"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receita" | "income" => Ok(TransactionKind::Income),
            "despesa" | "expense" => Ok(TransactionKind::Expense),
            "transferencia" | "transferência" | "transfer" => Ok(TransactionKind::Transfer),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

/// Row of the transaction list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: i64,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor", deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "conta_origem_nome", default)]
    pub account_name: Option<String>,
    #[serde(rename = "categoria_nome", default)]
    pub category_name: Option<String>,
    #[serde(rename = "categoria_icone", default)]
    pub category_icon: Option<String>,
}

/// Full transaction as returned on create/retrieve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "conta_origem")]
    pub source_account: i64,
    #[serde(rename = "conta_origem_detalhes", default)]
    pub source_account_details: Option<Account>,
    #[serde(rename = "conta_destino", default)]
    pub destination_account: Option<i64>,
    #[serde(rename = "conta_destino_detalhes", default)]
    pub destination_account_details: Option<Account>,
    #[serde(rename = "categoria", default)]
    pub category: Option<i64>,
    #[serde(rename = "categoria_detalhes", default)]
    pub category_details: Option<Category>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor", deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "observacoes", default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    #[serde(rename = "conta_origem")]
    pub source_account: i64,
    #[serde(rename = "conta_destino", skip_serializing_if = "Option::is_none")]
    pub destination_account: Option<i64>,
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "observacoes", skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        source_account: i64,
        description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            source_account,
            destination_account: None,
            category: None,
            description: description.into(),
            amount,
            date,
            notes: String::new(),
        }
    }

    /// Same rules the backend enforces, checked before sending
    pub fn validate(&self) -> Result<(), String> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err("Description is required".to_string());
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("Amount must be greater than zero".to_string());
        }

        match (self.kind, self.destination_account) {
            (TransactionKind::Transfer, None) => {
                Err("A transfer needs a destination account".to_string())
            }
            (TransactionKind::Transfer, Some(dest)) if dest == self.source_account => {
                Err("Cannot transfer to the same account".to_string())
            }
            (TransactionKind::Income | TransactionKind::Expense, Some(_)) => Err(format!(
                "{} must not have a destination account",
                self.kind
            )),
            _ => Ok(()),
        }
    }
}

/// Query filters for the transaction list. Unset filters are left out of
/// the query string.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    /// Matches either side of a transfer
    pub account: Option<i64>,
    pub category: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Backend ordering expression, e.g. `-data,-created_at`
    pub ordering: Option<String>,
}

impl TransactionFilter {
    /// Newest first, the order the dashboard shows
    pub fn recent() -> Self {
        Self {
            ordering: Some("-data,-created_at".to_string()),
            ..Self::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(kind) = self.kind {
            pairs.push(("tipo", kind.code().to_string()));
        }
        if let Some(account) = self.account {
            pairs.push(("conta", account.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("categoria", category.to_string()));
        }
        if let Some(start) = self.start {
            pairs.push(("data_inicio", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("data_fim", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(ref ordering) = self.ordering {
            if !ordering.is_empty() {
                pairs.push(("ordering", ordering.clone()));
            }
        }
        pairs
    }

    /// Query string including the leading `?`, or empty when no filter is set
    pub fn to_query(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("?{}", joined.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_list_row() {
        let json = r#"{"id":9,"tipo":"despesa","descricao":"Mercado","valor":"87.90","data":"2024-03-15","conta_origem_nome":"Nubank","categoria_nome":"Compras","categoria_icone":"shopping_cart"}"#;
        let row: TransactionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(row.kind, TransactionKind::Expense);
        assert_eq!(row.amount, 87.9);
        assert_eq!(row.date, date(2024, 3, 15));
        assert_eq!(row.category_name.as_deref(), Some("Compras"));
    }

    #[test]
    fn test_parse_full_transfer() {
        let json = r#"{"id":10,"tipo":"transferencia","conta_origem":1,"conta_origem_detalhes":null,
            "conta_destino":2,"conta_destino_detalhes":null,"categoria":null,"categoria_detalhes":null,
            "descricao":"Reserva","valor":"500.00","data":"2024-03-01","observacoes":"","created_at":"2024-03-01T12:00:00Z"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Transfer);
        assert_eq!(tx.destination_account, Some(2));
        assert_eq!(tx.category, None);
    }

    #[test]
    fn test_transfer_validation() {
        let mut tx = NewTransaction::new(TransactionKind::Transfer, 1, "Reserva", 100.0, date(2024, 1, 1));
        assert!(tx.validate().is_err());

        tx.destination_account = Some(1);
        assert_eq!(tx.validate().unwrap_err(), "Cannot transfer to the same account");

        tx.destination_account = Some(2);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_income_and_expense_reject_destination() {
        let mut tx = NewTransaction::new(TransactionKind::Expense, 1, "Aluguel", 1200.0, date(2024, 1, 5));
        assert!(tx.validate().is_ok());

        tx.destination_account = Some(2);
        assert!(tx.validate().unwrap_err().contains("Despesa"));
    }

    #[test]
    fn test_amount_and_description_validation() {
        let tx = NewTransaction::new(TransactionKind::Income, 1, "  ", 10.0, date(2024, 1, 1));
        assert!(tx.validate().is_err());

        let tx = NewTransaction::new(TransactionKind::Income, 1, "Salário", 0.0, date(2024, 1, 1));
        assert!(tx.validate().is_err());

        let tx = NewTransaction::new(TransactionKind::Income, 1, "x".repeat(201), 1.0, date(2024, 1, 1));
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_new_transaction_omits_empty_fields() {
        let tx = NewTransaction::new(TransactionKind::Income, 4, "Salário", 3000.0, date(2024, 2, 5));
        let body = serde_json::to_value(&tx).unwrap();
        assert_eq!(body["tipo"], "receita");
        assert_eq!(body["conta_origem"], 4);
        assert_eq!(body["data"], "2024-02-05");
        assert!(body.get("conta_destino").is_none());
        assert!(body.get("observacoes").is_none());
    }

    #[test]
    fn test_filter_query() {
        assert_eq!(TransactionFilter::default().to_query(), "");

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            account: Some(3),
            start: Some(date(2024, 3, 1)),
            end: Some(date(2024, 3, 31)),
            ..TransactionFilter::default()
        };
        assert_eq!(
            filter.to_query(),
            "?tipo=despesa&conta=3&data_inicio=2024-03-01&data_fim=2024-03-31"
        );

        assert_eq!(TransactionFilter::recent().to_query(), "?ordering=-data,-created_at");
    }
}
