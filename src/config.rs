//! Client configuration: backend base URL, token store location and request timeout.
//! Values are public; do not store secrets here.

use crate::error::{Error, Result};
use std::{env, path::PathBuf, time::Duration};
use url::Url;

/// Default request timeout applied to every outbound call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const TOKEN_STORE_FILE: &str = "tokens.json";
const FALLBACK_TOKEN_STORE: &str = "gatekeep-tokens.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub token_store_path: PathBuf,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Builds a config for `api_base_url` with the default store path and timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the URL is not `http(s)://` with a host.
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            token_store_path: default_token_store_path(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub fn with_token_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_store_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trims the URL and drops trailing slashes after checking scheme and host.
///
/// # Errors
///
/// Returns `Error::Config` for empty, unparsable, non-http(s) or host-less URLs.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL is empty".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|err| Error::Config(format!("Invalid API base URL {trimmed}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::Config(format!(
                "Unsupported scheme {scheme} in API base URL"
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config("API base URL has no host".to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// `$HOME/.config/gatekeep/tokens.json`, or `./gatekeep-tokens.json` without `HOME`.
#[must_use]
pub fn default_token_store_path() -> PathBuf {
    match env::var_os("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join(env!("CARGO_PKG_NAME"))
            .join(TOKEN_STORE_FILE),
        None => PathBuf::from(FALLBACK_TOKEN_STORE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_trailing_slash() -> Result<()> {
        assert_eq!(
            normalize_base_url("  https://api.example.com/v1/ ")?,
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("http://localhost:3000")?,
            "http://localhost:3000"
        );
        Ok(())
    }

    #[test]
    fn normalize_rejects_bad_urls() {
        for raw in ["", "   ", "not a url", "ftp://example.com", "file:///tmp/x"] {
            assert!(
                matches!(normalize_base_url(raw), Err(Error::Config(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn default_store_path_uses_home() {
        temp_env::with_vars([("HOME", Some("/home/alice"))], || {
            assert_eq!(
                default_token_store_path(),
                PathBuf::from("/home/alice/.config/gatekeep/tokens.json")
            );
        });
    }

    #[test]
    fn default_store_path_without_home() {
        temp_env::with_vars([("HOME", None::<&str>)], || {
            assert_eq!(
                default_token_store_path(),
                PathBuf::from("gatekeep-tokens.json")
            );
        });
    }

    #[test]
    fn builders_override_defaults() -> Result<()> {
        let config = ClientConfig::new("https://api.example.com/")?
            .with_token_store("/tmp/t.json")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.token_store_path, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        Ok(())
    }
}
