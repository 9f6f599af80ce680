use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::ArgMatches;

use moneta_core::models::{
    AccountKind, CategoryKind, NewAccount, NewCategory, NewTransaction, Preferences, TransactionFilter,
    TransactionKind,
};
use moneta_core::TokenStorageKind;

use super::actions::{Action, GlobalArgs};

fn string_arg(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).map(|s| s.trim().to_string())
}

fn required_string(matches: &ArgMatches, name: &str) -> Result<String> {
    string_arg(matches, name).ok_or_else(|| anyhow!("missing required argument: {}", name))
}

fn parse_enum<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    string_arg(matches, name)
        .map(|value| value.parse::<T>().map_err(|e| anyhow!(e)))
        .transpose()
}

/// True for `1.234` or `1.234.567`: dots that read as thousands separators
fn has_grouping_dots(s: &str) -> bool {
    let mut groups = s.split('.').skip(1).peekable();
    groups.peek().is_some() && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Accepts `87.90`, `87,90` and `1.234,56`.
///
/// Without a comma a dot is a decimal point, so `1.234` could mean either
/// reading and is rejected.
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim().trim_start_matches("R$").trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if has_grouping_dots(trimmed) {
        return Err(anyhow!(
            "Ambiguous amount: {} (write 1234 or 1.234,00)",
            input.trim()
        ));
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<f64>()
        .with_context(|| format!("Invalid amount: {}", input))
}

/// Accepts ISO `yyyy-mm-dd` and Brazilian `dd/mm/yyyy`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .with_context(|| format!("Invalid date: {} (use yyyy-mm-dd or dd/mm/yyyy)", input))
}

fn optional_date(matches: &ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    string_arg(matches, name).map(|s| parse_date(&s)).transpose()
}

fn period(matches: &ArgMatches) -> (u32, i32) {
    let today = Local::now().date_naive();
    (
        matches.get_one::<u32>("month").copied().unwrap_or_else(|| today.month()),
        matches.get_one::<i32>("year").copied().unwrap_or_else(|| today.year()),
    )
}

pub fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let token_storage = if matches.get_flag("ephemeral") {
        Some(TokenStorageKind::Memory)
    } else {
        parse_enum::<TokenStorageKind>(matches, "token-storage")?
    };

    Ok(GlobalArgs {
        api_url: string_arg(matches, "api-url").filter(|s| !s.is_empty()),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
        token_storage,
        json: matches.get_flag("json"),
        log_dir: matches.get_one::<std::path::PathBuf>("log-file").cloned(),
        verbosity: matches.get_count("verbosity"),
    })
}

fn account_action(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("create", sub)) => {
            let kind = parse_enum::<AccountKind>(sub, "kind")?.unwrap_or(AccountKind::Checking);
            let balance = parse_amount(&required_string(sub, "balance")?)?;
            let mut account = NewAccount::new(required_string(sub, "name")?, kind, balance);
            account.color = string_arg(sub, "color");
            Ok(Action::CreateAccount(account))
        }
        Some(("delete", sub)) => Ok(Action::DeleteAccount {
            id: sub.get_one::<i64>("id").copied().context("missing account id")?,
        }),
        _ => Ok(Action::ListAccounts),
    }
}

fn category_action(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("create", sub)) => {
            let kind = parse_enum::<CategoryKind>(sub, "kind")?.unwrap_or(CategoryKind::Expense);
            let mut category = NewCategory::new(required_string(sub, "name")?, kind);
            category.icon = string_arg(sub, "icon");
            category.color = string_arg(sub, "color");
            Ok(Action::CreateCategory(category))
        }
        Some(("list", sub)) => Ok(Action::ListCategories {
            kind: parse_enum::<CategoryKind>(sub, "kind")?,
        }),
        _ => Ok(Action::ListCategories { kind: None }),
    }
}

fn transaction_action(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("create", sub)) => {
            let kind = parse_enum::<TransactionKind>(sub, "kind")?.unwrap_or(TransactionKind::Expense);
            let date = optional_date(sub, "date")?.unwrap_or_else(|| Local::now().date_naive());
            let mut transaction = NewTransaction::new(
                kind,
                sub.get_one::<i64>("account").copied().context("missing source account")?,
                required_string(sub, "description")?,
                parse_amount(&required_string(sub, "amount")?)?,
                date,
            );
            transaction.destination_account = sub.get_one::<i64>("to-account").copied();
            transaction.category = sub.get_one::<i64>("category").copied();
            transaction.notes = string_arg(sub, "notes").unwrap_or_default();
            Ok(Action::CreateTransaction(transaction))
        }
        Some(("delete", sub)) => Ok(Action::DeleteTransaction {
            id: sub.get_one::<i64>("id").copied().context("missing transaction id")?,
        }),
        Some(("list", sub)) => {
            let filter = TransactionFilter {
                kind: parse_enum::<TransactionKind>(sub, "kind")?,
                account: sub.get_one::<i64>("account").copied(),
                category: sub.get_one::<i64>("category").copied(),
                start: optional_date(sub, "from")?,
                end: optional_date(sub, "to")?,
                ..TransactionFilter::recent()
            };
            Ok(Action::ListTransactions {
                filter,
                limit: sub.get_one::<usize>("limit").copied().unwrap_or(20),
            })
        }
        _ => Ok(Action::ListTransactions {
            filter: TransactionFilter::recent(),
            limit: 20,
        }),
    }
}

pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("login", sub)) => Ok(Action::Login {
            username: string_arg(sub, "username").filter(|s| !s.is_empty()),
        }),
        Some(("register", sub)) => Ok(Action::Register {
            username: required_string(sub, "username")?,
            email: required_string(sub, "email")?,
            first_name: string_arg(sub, "first-name").unwrap_or_default(),
            last_name: string_arg(sub, "last-name").unwrap_or_default(),
        }),
        Some(("logout", _)) => Ok(Action::Logout),
        Some(("whoami", _)) => Ok(Action::Whoami),
        Some(("status", _)) => Ok(Action::Status),
        Some(("preferences", sub)) => {
            let preferences = Preferences {
                dark_mode: sub.get_one::<bool>("dark-mode").copied(),
                notifications_enabled: sub.get_one::<bool>("notifications").copied(),
                phone: string_arg(sub, "phone"),
            };
            if preferences.is_empty() {
                return Err(anyhow!("nothing to update: pass --dark-mode, --notifications or --phone"));
            }
            Ok(Action::UpdatePreferences(preferences))
        }
        Some(("accounts", sub)) => account_action(sub),
        Some(("categories", sub)) => category_action(sub),
        Some(("transactions", sub)) => transaction_action(sub),
        Some(("summary", sub)) => {
            let (month, year) = period(sub);
            Ok(Action::Summary { month, year })
        }
        Some(("dashboard", sub)) => {
            let (month, year) = period(sub);
            Ok(Action::Dashboard { month, year })
        }
        Some((other, _)) => Err(anyhow!("unknown command: {}", other)),
        None => Err(anyhow!("no command given, see --help")),
    }
}
