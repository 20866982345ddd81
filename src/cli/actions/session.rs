//! Session subcommands: login, register, logout, refresh and status.

use crate::{
    api::ApiClient,
    auth::{
        manager::AuthSession,
        navigation::NoopNavigator,
        types::{Credentials, RegisterRequest},
    },
    config::ClientConfig,
    session::state::SessionState,
    token::{
        codec::decode_expiry,
        store::{FileTokenStore, TokenStore},
    },
};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct LoginArgs {
    pub config: ClientConfig,
    pub credentials: Credentials,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub config: ClientConfig,
    pub request: RegisterRequest,
}

/// Session backed by the on-disk token store named in `config`.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn connect(config: &ClientConfig) -> Result<Arc<AuthSession>> {
    let api = ApiClient::new(config)?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&config.token_store_path));
    debug!(store = %config.token_store_path.display(), "session opened");

    Ok(Arc::new(AuthSession::new(
        api,
        store,
        Arc::new(SessionState::new()),
        Arc::new(NoopNavigator),
    )))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// # Errors
/// Returns an error if the backend rejects the credentials or cannot be reached.
pub async fn login(args: LoginArgs) -> Result<()> {
    let session = connect(&args.config)?;
    let user = session
        .login(&args.credentials)
        .await
        .context("login failed")?;
    print_json(&user)
}

/// # Errors
/// Returns an error if the backend rejects the registration or cannot be reached.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let session = connect(&args.config)?;
    let user = session
        .register(&args.request)
        .await
        .context("registration failed")?;
    print_json(&user)
}

/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn logout(config: &ClientConfig) -> Result<()> {
    connect(config)?.logout();
    println!("logged out");
    Ok(())
}

/// # Errors
/// Returns an error if there is no refresh token or the backend rejects it.
pub async fn refresh(config: &ClientConfig) -> Result<()> {
    connect(config)?
        .refresh()
        .await
        .context("token refresh failed")?;
    println!("refreshed");
    Ok(())
}

/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn status(config: &ClientConfig) -> Result<()> {
    let session = connect(config)?;
    print_json(&status_report(&session))
}

/// Local view of the session; makes no backend call.
#[must_use]
pub fn status_report(session: &AuthSession) -> Value {
    let expires_at = session
        .get_token()
        .and_then(|token| decode_expiry(&token).ok());

    json!({
        "authenticated": session.is_logged_in(),
        "access_token_expires_at": expires_at,
        "has_refresh_token": session.get_refresh_token().is_some(),
    })
}
