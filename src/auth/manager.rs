//! Session lifecycle: login, logout, refresh and the authentication checks built on
//! them.
//!
//! `AuthSession` is the only writer of the token store and of `SessionState`. It is
//! created once by the host and shared through `Arc`; there is no global instance.
//! Session phases:
//!
//! - `Anonymous` -> `Authenticated` on login.
//! - `Authenticated` stays `Authenticated` when the access token expires; expiry is
//!   only noticed by the next `is_logged_in` / `ensure_authenticated` check.
//! - any phase -> `Refreshing` while a refresh is in flight, then `Authenticated` on
//!   success or `Anonymous` on failure (forced logout).
//! - any phase -> `Anonymous` on logout.

use crate::{
    api::ApiClient,
    auth::{
        client,
        navigation::{Navigator, Route},
        refresh::RefreshCoordinator,
        types::{Credentials, RegisterRequest, Tokens, User},
    },
    error::{Error, Result},
    session::state::SessionState,
    token::{codec::is_expired, store::TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY},
};
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
    Refreshing,
}

pub struct AuthSession {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    state: Arc<SessionState>,
    navigator: Arc<dyn Navigator>,
    refresh: RefreshCoordinator,
}

/// Holds `is_loading` up for the lifetime of the guard, including cancellation.
struct LoadingGuard<'a>(&'a SessionState);

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a SessionState) -> Self {
        state.set_loading(true);
        Self(state)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

impl AuthSession {
    /// Creates the session and restores the authenticated flag from a stored token.
    #[must_use]
    pub fn new(
        api: ApiClient,
        store: Arc<dyn TokenStore>,
        state: Arc<SessionState>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Self {
            api,
            store,
            state,
            navigator,
            refresh: RefreshCoordinator::new(),
        };
        session.restore();
        session
    }

    /// Marks the session authenticated when the stored access token is still valid.
    /// The user is not known until the next login.
    pub fn restore(&self) -> bool {
        let restored = self.is_logged_in();
        if restored {
            debug!("restored session from stored access token");
            self.state.set_authenticated(true);
        }
        restored
    }

    /// # Errors
    ///
    /// Returns `Error::Auth` when the backend rejects the credentials, or the
    /// transport error. Stored tokens and session state are left untouched.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let response = {
            let _loading = LoadingGuard::start(&self.state);
            client::login(&self.api, credentials).await
        }
        .inspect_err(|err| warn!("Login failed: {err}"))?;

        self.store_tokens(&response.tokens);
        self.state.set_current_user(Some(response.user.clone()));
        self.state.set_authenticated(true);

        info!(user_id = ?response.user.id, "login succeeded");
        Ok(response.user)
    }

    /// Creates an account without signing in.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` when the backend rejects the registration.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let user = client::register(&self.api, request).await?;
        info!(user_id = ?user.id, "registration succeeded");
        Ok(user)
    }

    /// Clears tokens and session state, then routes to login. Safe to call at any time.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
        self.state.set_current_user(None);
        self.state.set_authenticated(false);
        info!("session cleared");
        self.navigator.navigate(Route::Login);
    }

    /// Rotates the token pair. Only one refresh runs at a time; a caller arriving
    /// while one is in flight receives that refresh's outcome instead of starting
    /// another.
    ///
    /// # Errors
    ///
    /// - `Error::NoRefreshToken` when no refresh token is stored (no backend call).
    /// - The backend error when the refresh is rejected. The session is logged out
    ///   before the error is returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Tokens> {
        let Some(claim) = self.refresh.claim() else {
            debug!("refresh already in flight, waiting for its outcome");
            return self.refresh.wait().await;
        };

        let outcome = self.run_refresh().await;
        claim.finish(&outcome);
        outcome
    }

    async fn run_refresh(&self) -> Result<Tokens> {
        let Some(refresh_token) = self.get_refresh_token() else {
            return Err(Error::NoRefreshToken);
        };

        match client::refresh(&self.api, &refresh_token).await {
            Ok(tokens) => {
                self.store_tokens(&tokens);
                self.state.set_authenticated(true);
                info!("tokens refreshed");
                Ok(tokens)
            }
            Err(err) => {
                warn!("Token refresh failed: {err}");
                self.logout();
                Err(err)
            }
        }
    }

    /// An access token is stored and not expired.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.get_token().is_some_and(|token| !is_expired(&token))
    }

    /// Succeeds without a backend call when logged in, otherwise tries a refresh.
    ///
    /// # Errors
    ///
    /// Returns the refresh error, or `Error::NotAuthenticated` (after logging out)
    /// when there is no refresh token.
    #[instrument(skip(self))]
    pub async fn ensure_authenticated(&self) -> Result<()> {
        if self.is_logged_in() {
            return Ok(());
        }

        if self.get_refresh_token().is_some() {
            self.refresh().await.map(|_| ())
        } else {
            self.logout();
            Err(Error::NotAuthenticated)
        }
    }

    #[must_use]
    pub fn get_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    #[must_use]
    pub fn get_refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.user()
    }

    #[must_use]
    pub fn is_refresh_in_progress(&self) -> bool {
        self.refresh.is_in_progress()
    }

    /// Waits for the in-flight refresh, or returns the last outcome if none is running.
    pub(crate) async fn wait_for_refresh(&self) -> Result<Tokens> {
        self.refresh.wait().await
    }

    #[must_use]
    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub fn session_phase(&self) -> SessionPhase {
        if self.is_refresh_in_progress() {
            SessionPhase::Refreshing
        } else if self.state.authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    // Two separate writes; a crash in between leaves a mixed pair that the next
    // expiry check or refresh sorts out.
    fn store_tokens(&self, tokens: &Tokens) {
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token);
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("base_url", &self.api.base_url())
            .field("phase", &self.session_phase())
            .finish_non_exhaustive()
    }
}
