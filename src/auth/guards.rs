//! Access decisions for protected surfaces. These are UX-only guards; real access
//! control must live on the API.

use crate::auth::{manager::AuthSession, navigation::Route};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirected(Route),
}

impl Access {
    #[must_use]
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }
}

/// Grants access once the session is authenticated, refreshing if needed. A failed
/// check has already logged out, which routes to login.
pub async fn require_auth(session: &AuthSession) -> Access {
    match session.ensure_authenticated().await {
        Ok(()) => Access::Granted,
        Err(err) => {
            debug!("auth guard denied: {err}");
            Access::Redirected(Route::Login)
        }
    }
}

/// Like [`require_auth`], and the current user must be an administrator.
pub async fn require_admin(session: &AuthSession) -> Access {
    if let Err(err) = session.ensure_authenticated().await {
        debug!("admin guard denied: {err}");
        return Access::Redirected(Route::Login);
    }

    if session.current_user().is_some_and(|user| user.is_admin()) {
        Access::Granted
    } else {
        debug!("admin guard denied: user is not an administrator");
        session.navigator().navigate(Route::Login);
        Access::Redirected(Route::Login)
    }
}

/// Keeps signed-in users away from the login surface.
pub fn login_guard(session: &AuthSession) -> Access {
    if session.is_logged_in() {
        session.navigator().navigate(Route::Comments);
        Access::Redirected(Route::Comments)
    } else {
        Access::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::ApiClient,
        auth::{
            navigation::RecordingNavigator,
            types::{User, UserState},
        },
        error::Result,
        session::state::SessionState,
        token::{
            codec::{now_unix_seconds, tests::token_expiring_at},
            store::{MemoryTokenStore, TokenStore},
            ACCESS_TOKEN_KEY,
        },
    };
    use std::{sync::Arc, time::Duration};

    fn session(
        store: Arc<MemoryTokenStore>,
        navigator: Arc<RecordingNavigator>,
    ) -> Result<AuthSession> {
        Ok(AuthSession::new(
            ApiClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(1))?,
            store,
            Arc::new(SessionState::new()),
            navigator,
        ))
    }

    fn logged_in_store() -> Arc<MemoryTokenStore> {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(
            ACCESS_TOKEN_KEY,
            &token_expiring_at(now_unix_seconds() + 3600),
        );
        store
    }

    fn user(state: UserState) -> User {
        User {
            id: Some(1),
            username: "alice".to_string(),
            name: "Alice".to_string(),
            state,
        }
    }

    #[tokio::test]
    async fn require_auth_grants_logged_in() -> Result<()> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = session(logged_in_store(), navigator.clone())?;

        assert_eq!(require_auth(&session).await, Access::Granted);
        assert!(navigator.routes().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn require_auth_redirects_anonymous() -> Result<()> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = session(Arc::new(MemoryTokenStore::new()), navigator.clone())?;

        assert_eq!(require_auth(&session).await, Access::Redirected(Route::Login));
        assert_eq!(navigator.routes(), vec![Route::Login]);
        Ok(())
    }

    #[tokio::test]
    async fn require_admin_checks_user_state() -> Result<()> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = session(logged_in_store(), navigator.clone())?;

        session.state().set_current_user(Some(user(UserState::Active)));
        assert_eq!(require_admin(&session).await, Access::Redirected(Route::Login));
        assert_eq!(navigator.count(Route::Login), 1);

        session.state().set_current_user(Some(user(UserState::Admin)));
        assert!(require_admin(&session).await.is_granted());
        assert_eq!(navigator.count(Route::Login), 1);
        Ok(())
    }

    #[tokio::test]
    async fn require_admin_without_user_redirects() -> Result<()> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = session(logged_in_store(), navigator.clone())?;

        assert_eq!(require_admin(&session).await, Access::Redirected(Route::Login));
        Ok(())
    }

    #[test]
    fn login_guard_redirects_signed_in_users() -> Result<()> {
        let navigator = Arc::new(RecordingNavigator::new());
        let session = session(logged_in_store(), navigator.clone())?;

        assert_eq!(login_guard(&session), Access::Redirected(Route::Comments));
        assert_eq!(navigator.routes(), vec![Route::Comments]);

        session.logout();
        assert_eq!(login_guard(&session), Access::Granted);
        Ok(())
    }
}
