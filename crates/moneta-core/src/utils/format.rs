use chrono::NaiveDate;

use crate::models::TransactionKind;

/// Format an amount as Brazilian reais: `R$ 1.234,56`, `-R$ 10,00`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let units = cents / 100;
    let fraction = cents % 100;

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

/// Currency with the sign a transaction of `kind` carries in a statement
pub fn format_signed_currency(amount: f64, kind: TransactionKind) -> String {
    format!("{}{}", kind.sign(), format_currency(amount.abs()))
}

/// Format a date the way Brazilian users read it: `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// One decimal place with a comma, e.g. `42,5%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value).replace('.', ",")
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
