//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, with the client configuration
//! resolved once for every subcommand.

use crate::{
    auth::types::{Credentials, RegisterRequest},
    cli::{
        actions::{request, session, Action},
        commands::{
            client, ARG_DATA, ARG_METHOD, ARG_NAME, ARG_PASSWORD, ARG_PATH, ARG_USERNAME,
            CMD_LOGIN, CMD_LOGOUT, CMD_REFRESH, CMD_REGISTER, CMD_REQUEST, CMD_STATUS,
        },
    },
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use reqwest::Method;
use serde_json::Value;

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(name)
        .with_context(|| format!("missing required argument: --{name}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the configuration is invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let config = client::config(matches)?;

    match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Ok(Action::Login(session::LoginArgs {
            config,
            credentials: Credentials::new(
                required(sub, ARG_USERNAME)?.as_str(),
                required(sub, ARG_PASSWORD)?.as_str(),
            ),
        })),
        Some((CMD_REGISTER, sub)) => {
            let mut request = RegisterRequest::new(
                required(sub, ARG_USERNAME)?.as_str(),
                required(sub, ARG_PASSWORD)?.as_str(),
            );
            if let Some(name) = sub.get_one::<String>(ARG_NAME) {
                request = request.with_name(name.as_str());
            }
            Ok(Action::Register(session::RegisterArgs { config, request }))
        }
        Some((CMD_LOGOUT, _)) => Ok(Action::Logout(config)),
        Some((CMD_REFRESH, _)) => Ok(Action::Refresh(config)),
        Some((CMD_STATUS, _)) => Ok(Action::Status(config)),
        Some((CMD_REQUEST, sub)) => {
            let method = required(sub, ARG_METHOD)?;
            let method = Method::from_bytes(method.as_bytes())
                .with_context(|| format!("invalid HTTP method: {method}"))?;
            Ok(Action::Request(request::Args {
                config,
                method,
                path: required(sub, ARG_PATH)?.clone(),
                data: sub.get_one::<Value>(ARG_DATA).cloned(),
            }))
        }
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("missing command")),
    }
}
