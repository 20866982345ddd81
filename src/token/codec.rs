//! Offline expiry inspection for compact signed tokens (`header.payload.signature`).
//!
//! The client never trusts a token, it only needs to know when to stop presenting
//! one, so signatures are not verified here. Anything that cannot be decoded is
//! treated as expired.

use base64ct::{Base64, Base64Unpadded, Base64Url, Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Safety margin before `exp`: a token this close to expiry is already treated as
/// expired so in-flight requests do not race the boundary.
pub const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64 encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("missing exp claim")]
    MissingExp,
}

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
    Base64UrlUnpadded::decode_vec(segment)
        .or_else(|_| Base64Url::decode_vec(segment))
        .or_else(|_| Base64::decode_vec(segment))
        .or_else(|_| Base64Unpadded::decode_vec(segment))
        .map_err(|_| DecodeError::Base64)
}

/// Read the `exp` claim (unix seconds) from a token payload.
///
/// # Errors
///
/// Returns an error if the token is not three dot-separated segments, the payload is
/// not base64/JSON, or `exp` is missing.
pub fn decode_expiry(token: &str) -> Result<i64, DecodeError> {
    let mut parts = token.split('.');
    let _header = parts.next().ok_or(DecodeError::TokenFormat)?;
    let payload = parts.next().ok_or(DecodeError::TokenFormat)?;
    let _signature = parts.next().ok_or(DecodeError::TokenFormat)?;
    if parts.next().is_some() || payload.is_empty() {
        return Err(DecodeError::TokenFormat);
    }

    let bytes = decode_segment(payload)?;
    let claims: ExpiryClaims = serde_json::from_slice(&bytes)?;
    claims.exp.ok_or(DecodeError::MissingExp)
}

/// Expiry check against an explicit clock.
#[must_use]
pub fn is_expired_at(token: &str, now_unix_seconds: i64) -> bool {
    match decode_expiry(token) {
        Ok(exp) => now_unix_seconds >= exp.saturating_sub(EXPIRY_SKEW_SECONDS),
        Err(_) => true,
    }
}

/// Expiry check against the system clock.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_unix_seconds())
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
