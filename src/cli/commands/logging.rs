use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Highest count understood by the telemetry layer (TRACE).
const MAX_VERBOSITY: u8 = 4;

/// Accepts either a count (`0`..=`4`) or a level name for `GATEKEEP_LOG_LEVEL`.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> std::result::Result<u8, String> {
        if let Ok(count) = level.parse::<u8>() {
            return if count <= MAX_VERBOSITY {
                Ok(count)
            } else {
                Err(format!("log level must be between 0 and {MAX_VERBOSITY}"))
            };
        }

        match level.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(0),
            "warn" | "warning" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            other => Err(format!("invalid log level: {other}")),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log output on stderr: -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE")
            .env("GATEKEEP_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
