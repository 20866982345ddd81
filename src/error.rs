//! Error taxonomy for session and API operations.
//!
//! `Auth` is a backend rejection of credentials or a refresh and is meant to be shown
//! to the user. `NoRefreshToken` is a local precondition that never reaches the
//! backend. `NotAuthenticated` is a guard decision. Transport failures (`Network`,
//! `Timeout`, `Http`) pass through the request gate unchanged unless they are a 401
//! handled by the refresh protocol.
//!
//! The type is `Clone` so one refresh outcome can be handed to every waiting request.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Converts an HTTP failure on an authentication endpoint into `Auth`.
    /// Client errors (4xx) are credential or token rejections; anything else is kept.
    #[must_use]
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Error::Http { status, message } if (400..500).contains(&status) => {
                Error::Auth { status, message }
            }
            other => other,
        }
    }
}
