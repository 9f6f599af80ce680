use serde::{Deserialize, Serialize};

use super::amount::deserialize_amount;

/// Spending in one category for the month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpending {
    #[serde(rename = "categoria__nome")]
    pub name: String,
    #[serde(rename = "categoria__icone", default)]
    pub icon: Option<String>,
    #[serde(rename = "categoria__cor", default)]
    pub color: Option<String>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total: f64,
}

/// Aggregates computed by the backend for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "receitas", deserialize_with = "deserialize_amount")]
    pub income: f64,
    #[serde(rename = "despesas", deserialize_with = "deserialize_amount")]
    pub expenses: f64,
    #[serde(rename = "saldo", deserialize_with = "deserialize_amount")]
    pub balance: f64,
    /// Sorted by total, largest first
    #[serde(rename = "gastos_por_categoria", default)]
    pub spending_by_category: Vec<CategorySpending>,
}

impl MonthlySummary {
    /// Share of the month's expenses taken by a category, in percent
    pub fn share_of_expenses(&self, spending: &CategorySpending) -> f64 {
        if self.expenses <= 0.0 {
            0.0
        } else {
            spending.total / self.expenses * 100.0
        }
    }
}
