pub mod client;
pub mod logging;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        PossibleValuesParser, TypedValueParser, ValueParser,
    },
    Arg, ColorChoice, Command,
};
use serde_json::Value;

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_STATUS: &str = "status";
pub const CMD_REQUEST: &str = "request";

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NAME: &str = "name";
pub const ARG_METHOD: &str = "method";
pub const ARG_PATH: &str = "path";
pub const ARG_DATA: &str = "data";

fn validator_json() -> ValueParser {
    ValueParser::from(|raw: &str| -> std::result::Result<Value, String> {
        serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))
    })
}

fn username_arg() -> Arg {
    Arg::new(ARG_USERNAME)
        .long(ARG_USERNAME)
        .help("Account username")
        .env("GATEKEEP_USERNAME")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("GATEKEEP_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn subcommands() -> Vec<Command> {
    vec![
        Command::new(CMD_LOGIN)
            .about("Sign in and store the token pair")
            .arg(username_arg())
            .arg(password_arg()),
        Command::new(CMD_REGISTER)
            .about("Create an account (does not sign in)")
            .arg(username_arg())
            .arg(password_arg())
            .arg(
                Arg::new(ARG_NAME)
                    .long(ARG_NAME)
                    .help("Display name"),
            ),
        Command::new(CMD_LOGOUT).about("Clear the stored tokens"),
        Command::new(CMD_REFRESH).about("Rotate the token pair"),
        Command::new(CMD_STATUS).about("Show the stored session"),
        Command::new(CMD_REQUEST)
            .about("Send an authenticated request and print the response data")
            .arg(
                Arg::new(ARG_METHOD)
                    .help("HTTP method")
                    .required(true)
                    .ignore_case(true)
                    .value_parser(
                        PossibleValuesParser::new(["GET", "POST", "PUT", "PATCH", "DELETE"])
                            .map(|method| method.to_ascii_uppercase()),
                    ),
            )
            .arg(
                Arg::new(ARG_PATH)
                    .help("Path relative to the API base URL, example: /comments")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_DATA)
                    .short('d')
                    .long(ARG_DATA)
                    .help("JSON request body")
                    .value_parser(validator_json()),
            ),
    ]
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("gatekeep")
        .about("Token session client for the moderation console API")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(subcommands());

    let command = client::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const URL: &str = "https://api.console.tld";

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "gatekeep");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Token session client for the moderation console API".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars([("GATEKEEP_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "gatekeep",
                "--api-url",
                URL,
                "--token-store",
                "/tmp/tokens.json",
                "login",
                "--username",
                "alice",
                "--password",
                "p1",
            ]);

            assert_eq!(
                matches.get_one::<String>(client::ARG_API_URL).cloned(),
                Some(URL.to_string())
            );
            assert_eq!(
                matches.get_one::<PathBuf>(client::ARG_TOKEN_STORE).cloned(),
                Some(PathBuf::from("/tmp/tokens.json"))
            );
            assert_eq!(matches.get_one::<u64>(client::ARG_TIMEOUT).copied(), Some(10));

            let Some((name, sub)) = matches.subcommand() else {
                panic!("expected a subcommand");
            };
            assert_eq!(name, CMD_LOGIN);
            assert_eq!(
                sub.get_one::<String>(ARG_USERNAME).cloned(),
                Some("alice".to_string())
            );
            assert_eq!(
                sub.get_one::<String>(ARG_PASSWORD).cloned(),
                Some("p1".to_string())
            );
        });
    }

    #[test]
    fn test_request_args() {
        let matches = new()
            .try_get_matches_from(vec![
                "gatekeep", "--api-url", URL, "request", "patch", "/comments/3", "--data",
                r#"{"text":"hi"}"#,
            ])
            .ok();
        let sub = matches
            .as_ref()
            .and_then(|m| m.subcommand_matches(CMD_REQUEST));

        assert_eq!(
            sub.and_then(|s| s.get_one::<String>(ARG_METHOD)).cloned(),
            Some("PATCH".to_string())
        );
        assert_eq!(
            sub.and_then(|s| s.get_one::<Value>(ARG_DATA)).cloned(),
            Some(serde_json::json!({ "text": "hi" }))
        );
    }

    #[test]
    fn test_request_rejects_bad_input() {
        assert!(new()
            .try_get_matches_from(vec!["gatekeep", "--api-url", URL, "request", "TRACE", "/x"])
            .is_err());
        assert!(new()
            .try_get_matches_from(vec![
                "gatekeep", "--api-url", URL, "request", "POST", "/x", "--data", "{nope",
            ])
            .is_err());
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(new()
            .try_get_matches_from(vec!["gatekeep", "--api-url", URL, "--timeout", "0", "status"])
            .is_err());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("GATEKEEP_API_URL", Some(URL)),
                ("GATEKEEP_TOKEN_STORE", Some("/var/lib/gatekeep/tokens.json")),
                ("GATEKEEP_TIMEOUT", Some("3")),
                ("GATEKEEP_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["gatekeep", "status"]);
                assert_eq!(
                    matches.get_one::<String>(client::ARG_API_URL).cloned(),
                    Some(URL.to_string())
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(client::ARG_TOKEN_STORE).cloned(),
                    Some(PathBuf::from("/var/lib/gatekeep/tokens.json"))
                );
                assert_eq!(matches.get_one::<u64>(client::ARG_TIMEOUT).copied(), Some(3));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("GATEKEEP_LOG_LEVEL", Some(level)),
                    ("GATEKEEP_API_URL", Some(URL)),
                ],
                || {
                    let matches = new().get_matches_from(vec!["gatekeep", "status"]);
                    assert_eq!(
                        matches
                            .get_one::<u8>(logging::ARG_VERBOSITY)
                            .map(|v| usize::from(*v)),
                        Some(index)
                    );
                },
            );
        }
    }

    #[test]
    fn test_request_method_is_canonical() {
        for typed in ["get", "Get", "GET"] {
            let matches = new()
                .try_get_matches_from(vec!["gatekeep", "--api-url", URL, "request", typed, "/users"])
                .ok();
            let method = matches
                .as_ref()
                .and_then(|m| m.subcommand_matches(CMD_REQUEST))
                .and_then(|s| s.get_one::<String>(ARG_METHOD))
                .cloned();
            assert_eq!(method, Some("GET".to_string()));
        }

        let rejected =
            new().try_get_matches_from(vec!["gatekeep", "--api-url", URL, "request", "trace", "/"]);
        assert!(rejected.is_err());
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars([("GATEKEEP_LOG_LEVEL", None::<&str>)], || {
                let mut args = vec![
                    "gatekeep".to_string(),
                    "--api-url".to_string(),
                    URL.to_string(),
                ];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }
                args.push("status".to_string());

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches
                        .get_one::<u8>(logging::ARG_VERBOSITY)
                        .map(|v| usize::from(*v)),
                    Some(index)
                );
            });
        }
    }
}
