//! HTTP helpers for the console's JSON API with a consistent timeout and error
//! mapping. The client never stores tokens; callers pass the bearer explicitly.
//! Every success body is wrapped as `{data, success}` and unwrapped here.

pub mod gate;

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    APP_USER_AGENT,
};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info_span, Instrument};
use ulid::Ulid;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Correlation header sent on every request.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A request description that can be re-sent, so the gate can retry it once.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Authentication endpoints bypass the gate: no bearer, no refresh on 401.
    #[must_use]
    pub fn is_auth_endpoint(&self) -> bool {
        self.path.contains("/auth/")
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.api_base_url, config.timeout)
    }

    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// Sends `request` once, with `Authorization: Bearer` when a token is given.
    ///
    /// # Errors
    ///
    /// Returns `Error::Timeout` or `Error::Network` when no response arrives. HTTP
    /// error statuses are returned as a normal response.
    pub async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Response> {
        let url = self.url(&request.path);
        let request_id = Ulid::new().to_string();

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let span = info_span!(
            "api.request",
            http.method = %request.method,
            url = %url,
            request_id = %request_id
        );
        builder.send().instrument(span).await.map_err(map_request_error)
    }

    /// Posts to an unauthenticated endpoint and unwraps the envelope.
    pub(crate) async fn post_unauthenticated<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T> {
        let response = self.send(&ApiRequest::post(path, body), None).await?;
        handle_json_response(response).await
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `Error` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout("Request timed out. Please try again.".to_string())
    } else {
        Error::Network(format!("Unable to reach the server: {err}"))
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Extracts `data` from a `{data, success}` body.
fn unwrap_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|err| Error::Parse(format!("Failed to decode response: {err}")))?;

    if !envelope.success {
        let message = envelope
            .message
            .map(sanitize_body)
            .unwrap_or_else(|| "Request rejected by server.".to_string());
        return Err(Error::Rejected(message));
    }

    envelope
        .data
        .ok_or_else(|| Error::Parse("Failed to decode response: missing data".to_string()))
}

/// Unwraps JSON envelopes and surfaces HTTP errors with sanitized bodies.
pub(crate) async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = error_for_status(response).await?;
    let body = response
        .bytes()
        .await
        .map_err(|err| Error::Parse(format!("Failed to read response: {err}")))?;
    unwrap_envelope(&body)
}

/// Like `handle_json_response`, but a 204 or empty body yields `None`.
pub(crate) async fn handle_optional_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<Option<T>> {
    let response = error_for_status(response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| Error::Parse(format!("Failed to read response: {err}")))?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    unwrap_envelope(&body).map(Some)
}

/// Handles responses whose body is ignored.
pub(crate) async fn handle_empty_response(response: Response) -> Result<()> {
    error_for_status(response).await.map(|_| ())
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::Http {
            status: status.as_u16(),
            message: error_message(body),
        })
    }
}

/// Prefers the `message` (then `error`) field of a JSON error body over its raw text.
fn error_message(body: String) -> String {
    let field = serde_json::from_str::<Value>(&body).ok().and_then(|value| {
        ["message", "error"].iter().find_map(|key| match value.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
            Some(Value::Object(inner)) => inner
                .get("message")
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string),
            _ => None,
        })
    });
    sanitize_body(field.unwrap_or(body))
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
