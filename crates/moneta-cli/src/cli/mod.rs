pub mod actions;
pub mod commands;
pub mod dispatch;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

use crate::logging;
use actions::{Action, GlobalArgs};

/// Parse the command line and install logging.
///
/// Keep the returned guard alive until exit so buffered file logs are
/// flushed.
pub fn start() -> Result<(Action, GlobalArgs, Option<WorkerGuard>)> {
    let matches = commands::new().get_matches();

    let globals = dispatch::globals(&matches)?;
    let guard = logging::init(globals.verbosity, globals.log_dir.as_deref())?;

    let action = dispatch::handler(&matches)?;

    Ok((action, globals, guard))
}
