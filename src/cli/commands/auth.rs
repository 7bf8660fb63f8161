use crate::api::handlers::auth::{AuthType, DEFAULT_EXCLUDED_PATHS};
use clap::{builder::ValueParser, Arg, Command};

pub const ARG_AUTH_TYPE: &str = "auth-type";
pub const ARG_SESSION_DURATION: &str = "session-duration";
pub const ARG_SESSION_NAME: &str = "session-name";
pub const ARG_EXCLUDED_PATHS: &str = "excluded-paths";

/// Seconds; anything that is not an integer reads as `0` (never expires).
#[must_use]
pub fn validator_session_duration() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<i64, String> {
        Ok(value.trim().parse::<i64>().unwrap_or(0))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_TYPE)
                .long(ARG_AUTH_TYPE)
                .help("Authentication strategy; unset disables the gate")
                .env("AUTH_TYPE")
                .value_parser(AuthType::VALUES),
        )
        .arg(
            Arg::new(ARG_SESSION_DURATION)
                .long(ARG_SESSION_DURATION)
                .help("Session lifetime in seconds, 0 or negative never expires")
                .env("SESSION_DURATION")
                .default_value("0")
                .allow_hyphen_values(true)
                .value_parser(validator_session_duration()),
        )
        .arg(
            Arg::new(ARG_SESSION_NAME)
                .long(ARG_SESSION_NAME)
                .help("Name of the session cookie")
                .env("SESSION_NAME"),
        )
        .arg(
            Arg::new(ARG_EXCLUDED_PATHS)
                .long(ARG_EXCLUDED_PATHS)
                .help("Comma separated paths that skip authentication, a trailing * matches a prefix")
                .env("AUTH_EXCLUDED_PATHS")
                .value_delimiter(',')
                .default_values(DEFAULT_EXCLUDED_PATHS),
        )
}
