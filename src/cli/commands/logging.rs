use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_LEVEL: &str = "log-level";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long("log-level")
                .help("Log level by name or number, raised further by -v")
                .env("SESSIONGATE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Set)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_names_and_numbers() {
        let command = with_args(Command::new("sessiongate"));
        for (index, level) in ["error", "warn", "info", "debug", "trace"].iter().enumerate() {
            temp_env::with_vars([("SESSIONGATE_LOG_LEVEL", Some(*level))], || {
                let matches = command.clone().get_matches_from(vec!["sessiongate"]);
                assert_eq!(
                    matches.get_one::<u8>(ARG_LOG_LEVEL).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn log_level_flag_overrides_env() {
        temp_env::with_vars([("SESSIONGATE_LOG_LEVEL", Some("warn"))], || {
            let matches = with_args(Command::new("sessiongate")).get_matches_from(vec![
                "sessiongate",
                "--log-level",
                "3",
            ]);
            assert_eq!(matches.get_one::<u8>(ARG_LOG_LEVEL).copied(), Some(3));
        });
    }

    #[test]
    fn verbose_count_is_independent_of_env() {
        temp_env::with_vars([("SESSIONGATE_LOG_LEVEL", Some("info"))], || {
            let matches =
                with_args(Command::new("sessiongate")).get_matches_from(vec!["sessiongate", "-vv"]);
            assert_eq!(matches.get_count(ARG_VERBOSITY), 2);
            assert_eq!(matches.get_one::<u8>(ARG_LOG_LEVEL).copied(), Some(2));
        });
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        temp_env::with_vars([("SESSIONGATE_LOG_LEVEL", Some("loud"))], || {
            let result = with_args(Command::new("sessiongate"))
                .try_get_matches_from(vec!["sessiongate"]);
            assert!(result.is_err());
        });
    }
}
