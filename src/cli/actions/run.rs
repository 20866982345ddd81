use crate::cli::actions::{request, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => session::login(args).await,
        Action::Register(args) => session::register(args).await,
        Action::Logout(config) => session::logout(&config),
        Action::Refresh(config) => session::refresh(&config).await,
        Action::Status(config) => session::status(&config),
        Action::Request(args) => request::execute(args).await,
    }
}
