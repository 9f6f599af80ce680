use anyhow::Result;
use serde_json::json;

use moneta_core::models::{
    total_balance, Account, CategoryKind, MonthlySummary, NewAccount, NewCategory, NewTransaction,
    TransactionFilter, TransactionSummary,
};
use moneta_core::utils::{format_currency, format_date, format_percent, format_signed_currency, truncate_string};

use super::AppContext;
use crate::output::{print_json, print_table, Column};

/// Rows the dashboard shows under "recent transactions"
const DASHBOARD_RECENT_ROWS: usize = 5;

const DESCRIPTION_WIDTH: usize = 32;

fn account_rows(accounts: &[Account]) -> Vec<Vec<String>> {
    accounts
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                truncate_string(&a.name, DESCRIPTION_WIDTH),
                a.kind.display_name().to_string(),
                format_currency(a.balance),
            ]
        })
        .collect()
}

fn print_accounts(accounts: &[Account]) {
    print_table(
        &[
            Column::left("Id"),
            Column::left("Conta"),
            Column::left("Tipo"),
            Column::right("Saldo"),
        ],
        &account_rows(accounts),
    );
    println!("\nSaldo total: {}", format_currency(total_balance(accounts)));
}

fn transaction_rows(transactions: &[TransactionSummary]) -> Vec<Vec<String>> {
    transactions
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                format_date(t.date),
                truncate_string(&t.description, DESCRIPTION_WIDTH),
                t.category_name.clone().unwrap_or_else(|| "-".to_string()),
                t.account_name.clone().unwrap_or_else(|| "-".to_string()),
                format_signed_currency(t.amount, t.kind),
            ]
        })
        .collect()
}

fn print_transactions(transactions: &[TransactionSummary]) {
    if transactions.is_empty() {
        println!("Nenhuma transação encontrada");
        return;
    }
    print_table(
        &[
            Column::left("Id"),
            Column::left("Data"),
            Column::left("Descrição"),
            Column::left("Categoria"),
            Column::left("Conta"),
            Column::right("Valor"),
        ],
        &transaction_rows(transactions),
    );
}

fn print_summary(summary: &MonthlySummary) {
    println!("Resumo {:02}/{}", summary.month, summary.year);
    println!("  Receitas: {}", format_currency(summary.income));
    println!("  Despesas: {}", format_currency(summary.expenses));
    println!("  Saldo:    {}", format_currency(summary.balance));

    if summary.spending_by_category.is_empty() {
        return;
    }
    println!();
    let rows: Vec<Vec<String>> = summary
        .spending_by_category
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                format_currency(s.total),
                format_percent(summary.share_of_expenses(s)),
            ]
        })
        .collect();
    print_table(
        &[Column::left("Categoria"), Column::right("Total"), Column::right("%")],
        &rows,
    );
}

pub async fn list_accounts(ctx: &AppContext) -> Result<()> {
    let accounts = ctx.client.list_accounts().await?;
    if ctx.json {
        return print_json(&accounts);
    }
    print_accounts(&accounts);
    Ok(())
}

pub async fn create_account(ctx: &AppContext, account: &NewAccount) -> Result<()> {
    let created = ctx.client.create_account(account).await?;
    if ctx.json {
        return print_json(&created);
    }
    println!(
        "Created account {} ({}, {})",
        created.id,
        created.name,
        format_currency(created.balance)
    );
    Ok(())
}

pub async fn delete_account(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.client.delete_account(id).await?;
    println!("Deleted account {}", id);
    Ok(())
}

pub async fn list_categories(ctx: &AppContext, kind: Option<CategoryKind>) -> Result<()> {
    let mut categories = ctx.client.list_categories().await?;
    if let Some(kind) = kind {
        categories.retain(|c| c.kind == kind);
    }
    if ctx.json {
        return print_json(&categories);
    }

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.kind.to_string(),
                if c.is_default { "sim" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(
        &[
            Column::left("Id"),
            Column::left("Categoria"),
            Column::left("Tipo"),
            Column::left("Padrão"),
        ],
        &rows,
    );
    Ok(())
}

pub async fn create_category(ctx: &AppContext, category: &NewCategory) -> Result<()> {
    let created = ctx.client.create_category(category).await?;
    if ctx.json {
        return print_json(&created);
    }
    println!("Created category {} ({})", created.id, created.name);
    Ok(())
}

pub async fn list_transactions(ctx: &AppContext, filter: &TransactionFilter, limit: usize) -> Result<()> {
    let mut transactions = ctx.client.list_transactions(filter).await?;
    transactions.truncate(limit);
    if ctx.json {
        return print_json(&transactions);
    }
    print_transactions(&transactions);
    Ok(())
}

pub async fn create_transaction(ctx: &AppContext, transaction: &NewTransaction) -> Result<()> {
    let created = ctx.client.create_transaction(transaction).await?;
    if ctx.json {
        return print_json(&created);
    }
    println!(
        "Recorded {} {} on {} ({})",
        created.kind,
        format_currency(created.amount),
        format_date(created.date),
        created.description
    );
    Ok(())
}

pub async fn delete_transaction(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.client.delete_transaction(id).await?;
    println!("Deleted transaction {}", id);
    Ok(())
}

pub async fn summary(ctx: &AppContext, month: u32, year: i32) -> Result<()> {
    let summary = ctx.client.monthly_summary(month, year).await?;
    if ctx.json {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

/// Fetches everything the overview needs at once; one failure fails the
/// whole command.
pub async fn dashboard(ctx: &AppContext, month: u32, year: i32) -> Result<()> {
    let recent_filter = TransactionFilter::recent();
    let (accounts, categories, summary, mut recent) = futures::try_join!(
        ctx.client.list_accounts(),
        ctx.client.list_categories(),
        ctx.client.monthly_summary(month, year),
        ctx.client.list_transactions(&recent_filter),
    )?;
    recent.truncate(DASHBOARD_RECENT_ROWS);

    if ctx.json {
        return print_json(&json!({
            "accounts": accounts,
            "total_balance": total_balance(&accounts),
            "categories": categories.len(),
            "summary": summary,
            "recent_transactions": recent,
        }));
    }

    print_accounts(&accounts);
    println!();
    print_summary(&summary);
    println!("\nÚltimas transações");
    print_transactions(&recent);
    println!("\n{} categorias disponíveis", categories.len());
    Ok(())
}
