//! Calls to the authentication endpoints. These never carry a bearer token and are
//! never retried; a 4xx answer is reported as `Error::Auth`.

use crate::{
    api::ApiClient,
    auth::types::{Credentials, LoginResponse, RegisterRequest, Tokens, User},
    error::{Error, Result},
};
use serde_json::json;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Exchanges credentials for a token pair and the signed-in user.
///
/// # Errors
///
/// Returns `Error::Auth` when the backend rejects the credentials, otherwise the
/// transport or decoding error.
pub async fn login(api: &ApiClient, credentials: &Credentials) -> Result<LoginResponse> {
    api.post_unauthenticated(LOGIN_PATH, credentials.to_payload())
        .await
        .map_err(Error::into_auth)
}

/// Creates an account. The new user is not signed in.
///
/// # Errors
///
/// Returns `Error::Auth` when the backend rejects the registration.
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<User> {
    api.post_unauthenticated(REGISTER_PATH, request.to_payload())
        .await
        .map_err(Error::into_auth)
}

/// Rotates the token pair.
///
/// # Errors
///
/// Returns `Error::Auth` when the refresh token is rejected.
pub async fn refresh(api: &ApiClient, refresh_token: &str) -> Result<Tokens> {
    api.post_unauthenticated(REFRESH_PATH, json!({ "refreshToken": refresh_token }))
        .await
        .map_err(Error::into_auth)
}
