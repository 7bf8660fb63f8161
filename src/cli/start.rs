use crate::cli::{actions::Action, commands, dispatch::handler, telemetry};
use anyhow::Result;

/// Parse the command line, initialize tracing and return the action to run.
/// # Errors
/// Returns an error if tracing cannot be initialized or arguments are inconsistent.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity_level = get_verbosity_level(&matches);

    telemetry::init(verbosity_level)?;

    handler(&matches)
}

// The louder of `-v` repetitions and `--log-level`/`SESSIONGATE_LOG_LEVEL` wins.
fn get_verbosity_level(matches: &clap::ArgMatches) -> Option<tracing::Level> {
    let count = matches.get_count(commands::logging::ARG_VERBOSITY);
    let named = matches
        .get_one::<u8>(commands::logging::ARG_LOG_LEVEL)
        .copied()
        .unwrap_or(0);

    match count.max(named) {
        0 => Some(tracing::Level::ERROR),
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}
