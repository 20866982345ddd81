//! Request and response payloads for the authentication endpoints. Credentials and
//! tokens travel through these types, so their `Debug` output is redacted and they
//! must never be logged.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials. Transient: held only for the duration of the request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub(crate) fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
    pub name: Option<String>,
}

impl RegisterRequest {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn to_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        });
        if let (Some(name), Some(object)) = (&self.name, payload.as_object_mut()) {
            object.insert("name".to_string(), serde_json::Value::from(name.as_str()));
        }
        payload
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .field("name", &self.name)
            .finish()
    }
}

/// Access/refresh token pair. Always stored and cleared together.
///
/// The backend has used both camelCase and snake_case field names, so both are
/// accepted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(rename = "accessToken", alias = "access_token")]
    pub access_token: String,
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    pub refresh_token: String,
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: Tokens,
    pub user: User,
}

/// Account state as the backend encodes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum UserState {
    Public,
    Inactive,
    Active,
    Admin,
}

impl From<UserState> for i8 {
    fn from(state: UserState) -> Self {
        match state {
            UserState::Public => -1,
            UserState::Inactive => 0,
            UserState::Active => 1,
            UserState::Admin => 2,
        }
    }
}

impl TryFrom<i8> for UserState {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(UserState::Public),
            0 => Ok(UserState::Inactive),
            1 => Ok(UserState::Active),
            2 => Ok(UserState::Admin),
            other => Err(format!("unknown user state: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub state: UserState,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state == UserState::Admin
    }
}
