//! Connection arguments shared by every subcommand.

use crate::config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TOKEN_STORE: &str = "token-store";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .short('u')
                .long(ARG_API_URL)
                .help("Backend base URL, example: https://api.console.tld/v1")
                .env("GATEKEEP_API_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_STORE)
                .long(ARG_TOKEN_STORE)
                .help("Token store file (default: $HOME/.config/gatekeep/tokens.json)")
                .env("GATEKEEP_TOKEN_STORE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("GATEKEEP_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

/// Build the client configuration from validated matches.
///
/// # Errors
/// Returns an error if the base URL is missing or invalid.
pub fn config(matches: &ArgMatches) -> Result<ClientConfig> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .context("missing required argument: --api-url")?;

    let mut config = ClientConfig::new(api_url).context("invalid GATEKEEP_API_URL")?;

    if let Some(path) = matches.get_one::<PathBuf>(ARG_TOKEN_STORE) {
        config = config.with_token_store(path);
    }

    let timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(config.with_timeout(Duration::from_secs(timeout)))
}
