//! Persisted token pair and offline expiry inspection.
//!
//! The store is the only place tokens live; the codec only reads `exp` from an access
//! token's payload and never verifies a signature.

pub mod codec;
pub mod store;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
