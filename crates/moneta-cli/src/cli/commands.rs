use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

fn account_commands() -> Command {
    Command::new("accounts")
        .about("List and manage accounts")
        .subcommand(Command::new("list").about("List accounts with their balances"))
        .subcommand(
            Command::new("create")
                .about("Create an account")
                .arg(Arg::new("name").help("Account name").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("dinheiro, conta_corrente, poupanca, cartao_credito, cartao_debito, investimento, outro")
                        .default_value("conta_corrente"),
                )
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .short('b')
                        .help("Opening balance")
                        .allow_hyphen_values(true)
                        .default_value("0"),
                )
                .arg(Arg::new("color").long("color").help("Color as #RRGGBB")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an account")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
}

fn category_commands() -> Command {
    Command::new("categories")
        .about("List and create categories")
        .subcommand(
            Command::new("list")
                .about("List categories, defaults included")
                .arg(Arg::new("kind").long("kind").short('k').help("receita or despesa")),
        )
        .subcommand(
            Command::new("create")
                .about("Create a category")
                .arg(Arg::new("name").help("Category name").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("receita or despesa")
                        .default_value("despesa"),
                )
                .arg(Arg::new("icon").long("icon").help("Icon name"))
                .arg(Arg::new("color").long("color").help("Color as #RRGGBB")),
        )
}

fn transaction_commands() -> Command {
    Command::new("transactions")
        .about("List and record transactions")
        .subcommand(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(Arg::new("kind").long("kind").short('k').help("receita, despesa or transferencia"))
                .arg(
                    Arg::new("account")
                        .long("account")
                        .short('a')
                        .help("Account id")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('c')
                        .help("Category id")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(Arg::new("from").long("from").help("Start date (yyyy-mm-dd or dd/mm/yyyy)"))
                .arg(Arg::new("to").long("to").help("End date (yyyy-mm-dd or dd/mm/yyyy)"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .short('n')
                        .help("Maximum rows to show")
                        .default_value("20")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Record a transaction")
                .arg(Arg::new("description").help("Description").required(true))
                .arg(Arg::new("amount").help("Amount, e.g. 87.90 or 87,90").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("receita, despesa or transferencia")
                        .default_value("despesa"),
                )
                .arg(
                    Arg::new("account")
                        .long("account")
                        .short('a')
                        .help("Source account id")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("to-account")
                        .long("to-account")
                        .help("Destination account id, transfers only")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('c')
                        .help("Category id")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(Arg::new("date").long("date").short('d').help("Date, defaults to today"))
                .arg(Arg::new("notes").long("notes").help("Free-form notes")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a transaction")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
}

fn period_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("month")
                .long("month")
                .short('m')
                .help("Month (1-12), defaults to the current month")
                .value_parser(clap::value_parser!(u32).range(1..=12)),
        )
        .arg(
            Arg::new("year")
                .long("year")
                .short('y')
                .help("Year, defaults to the current year")
                .value_parser(clap::value_parser!(i32)),
        )
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("moneta")
        .about("Personal finance from the command line")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("API base URL, example: https://moneta.example.com/api")
                .env("MONETA_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .env("MONETA_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("token-storage")
                .long("token-storage")
                .help("Where to keep the session tokens")
                .env("MONETA_TOKEN_STORAGE")
                .global(true)
                .value_parser(["file", "keyring", "memory"]),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Keep tokens in memory only, for this invocation (overrides --token-storage)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print raw JSON instead of tables")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Directory for a daily rolling log file")
                .env("MONETA_LOG_DIR")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: -v info, -vv debug, -vvv trace (default: warn)")
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and store the session tokens")
                .arg(Arg::new("username").help("Username, defaults to the last one used")),
        )
        .subcommand(
            Command::new("register")
                .about("Create a new user")
                .arg(Arg::new("username").required(true))
                .arg(Arg::new("email").long("email").short('e').required(true))
                .arg(Arg::new("first-name").long("first-name").help("First name"))
                .arg(Arg::new("last-name").long("last-name").help("Last name")),
        )
        .subcommand(Command::new("logout").about("Discard the stored session"))
        .subcommand(Command::new("whoami").about("Show the logged-in user"))
        .subcommand(Command::new("status").about("Show configuration and session state without contacting the API"))
        .subcommand(
            Command::new("preferences")
                .about("Update user preferences")
                .arg(
                    Arg::new("dark-mode")
                        .long("dark-mode")
                        .value_parser(clap::value_parser!(bool)),
                )
                .arg(
                    Arg::new("notifications")
                        .long("notifications")
                        .value_parser(clap::value_parser!(bool)),
                )
                .arg(Arg::new("phone").long("phone")),
        )
        .subcommand(account_commands())
        .subcommand(category_commands())
        .subcommand(transaction_commands())
        .subcommand(period_args(
            Command::new("summary").about("Income, expenses and spending per category for a month"),
        ))
        .subcommand(period_args(
            Command::new("dashboard").about("Balances, month summary and recent transactions"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "moneta");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Personal finance from the command line"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_command_definition_is_valid() {
        new().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let matches = new().get_matches_from(vec![
            "moneta",
            "accounts",
            "list",
            "--api-url",
            "http://127.0.0.1:9000/api",
            "-vv",
            "--json",
        ]);

        assert_eq!(
            matches.get_one::<String>("api-url").map(String::as_str),
            Some("http://127.0.0.1:9000/api")
        );
        assert_eq!(matches.get_count("verbosity"), 2);
        assert!(matches.get_flag("json"));
    }

    #[test]
    fn test_token_storage_values() {
        assert!(new()
            .try_get_matches_from(vec!["moneta", "--token-storage", "vault", "status"])
            .is_err());

        let matches = new().get_matches_from(vec!["moneta", "status", "--ephemeral"]);
        assert!(matches.get_flag("ephemeral"));
    }

    #[test]
    fn test_summary_month_range() {
        assert!(new()
            .try_get_matches_from(vec!["moneta", "summary", "--month", "13"])
            .is_err());
        assert!(new()
            .try_get_matches_from(vec!["moneta", "summary", "--month", "12", "--year", "2024"])
            .is_ok());
    }

    #[test]
    fn test_negative_opening_balance() {
        let matches = new().get_matches_from(vec![
            "moneta", "accounts", "create", "Cartão", "--kind", "cartao_credito", "--balance", "-250",
        ]);
        let (_, accounts) = matches.subcommand().unwrap();
        let (_, create) = accounts.subcommand().unwrap();
        assert_eq!(create.get_one::<String>("balance").map(String::as_str), Some("-250"));
    }
}
