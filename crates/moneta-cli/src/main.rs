//! moneta - a command-line client for the moneta personal finance API.
//!
//! Logs in against the backend, keeps the session tokens between runs, and
//! renews them transparently while listing and recording accounts,
//! categories and transactions.

mod cli;
mod handlers;
mod logging;
mod navigator;
mod output;

use anyhow::Result;
use tracing::{debug, info};

use handlers::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let (action, globals, _log_guard) = cli::start()?;
    info!("moneta starting");
    debug!(?action, "Parsed command");

    let mut ctx = AppContext::new(&globals)?;
    handlers::handle(action, &mut ctx).await
}
