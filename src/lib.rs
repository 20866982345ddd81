//! # Gatekeep (token session client for the moderation console API)
//!
//! `gatekeep` keeps an authenticated session against the console's REST backend.
//! It stores the access/refresh token pair, reads token expiry without verifying
//! signatures, publishes session state to subscribers, and gates outbound calls
//! with a bearer token.
//!
//! ## Session Flow
//!
//! 1. **Login:** `AuthSession::login` posts credentials to `/auth/login`, persists both
//!    tokens, and publishes the user through `SessionState`.
//! 2. **Gated calls:** `RequestGate` attaches `Authorization: Bearer <access>` to every
//!    call outside `/auth/`.
//! 3. **Refresh:** a `401` on a gated call triggers one refresh through
//!    `/auth/refresh-token`. Concurrent `401`s wait for the same refresh and are retried
//!    once with the rotated token.
//! 4. **Teardown:** a failed refresh always logs out (fail-closed).
//!
//! Token material and passwords must never be logged; the types that carry them
//! redact their `Debug` output.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod token;

pub use api::{gate::RequestGate, ApiClient, ApiRequest};
pub use auth::{
    guards::{login_guard, require_admin, require_auth, Access},
    manager::{AuthSession, SessionPhase},
    navigation::{Navigator, NoopNavigator, RecordingNavigator, Route},
    types::{Credentials, LoginResponse, RegisterRequest, Tokens, User, UserState},
};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use session::{
    observable::{Observable, Subscription},
    state::SessionState,
};
pub use token::{
    codec::{decode_expiry, is_expired, is_expired_at, DecodeError},
    store::{FileTokenStore, MemoryTokenStore, TokenStore},
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
