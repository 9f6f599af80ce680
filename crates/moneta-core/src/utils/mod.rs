//! Display helpers shared by the CLI and any other front end.

pub mod format;

pub use format::{format_currency, format_date, format_percent, format_signed_currency, truncate_string};
