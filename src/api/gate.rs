//! Outbound call gate: attaches the bearer token and recovers from `401` with a
//! single-flight refresh.
//!
//! Calls under `/auth/` bypass the gate entirely so a refresh can never recurse into
//! another refresh. Every other call is re-issued at most once.

use crate::{
    api::{handle_empty_response, handle_json_response, ApiRequest},
    auth::manager::AuthSession,
    error::{Error, Result},
};
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone, Debug)]
pub struct RequestGate {
    session: Arc<AuthSession>,
}

impl RequestGate {
    #[must_use]
    pub fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Sends `request` with the current access token. On `401` the token is renewed
    /// and the request is re-issued exactly once; that second response is returned
    /// whatever its status.
    ///
    /// # Errors
    ///
    /// Transport errors pass through unchanged. When the token cannot be renewed the
    /// refresh error is returned and the session has been logged out.
    #[instrument(skip(self, request), fields(http.method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<Response> {
        let api = self.session.api();

        if request.is_auth_endpoint() {
            return api.send(&request, None).await;
        }

        let sent_token = self.session.get_token();
        let response = api.send(&request, sent_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let token = self.renewed_token(sent_token.as_deref()).await?;
        debug!("re-issuing request after 401");
        api.send(&request, Some(&token)).await
    }

    /// Token to retry with after a `401` for a request sent with `sent`.
    async fn renewed_token(&self, sent: Option<&str>) -> Result<String> {
        // Another request may already have rotated the pair while this one was in
        // flight; its token is fresh and no new refresh is needed.
        if let Some(current) = self.session.get_token() {
            if sent != Some(current.as_str()) {
                debug!("access token rotated while request was in flight");
                return Ok(current);
            }
        }

        let tokens = if self.session.is_refresh_in_progress() {
            debug!("waiting for in-flight refresh");
            self.session.wait_for_refresh().await?
        } else {
            self.session.refresh().await?
        };
        Ok(tokens.access_token)
    }

    /// # Errors
    ///
    /// See [`RequestGate::execute`]; non-2xx responses map to `Error::Http`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        handle_json_response(self.execute(ApiRequest::get(path)).await?).await
    }

    /// # Errors
    ///
    /// See [`RequestGate::execute`]; non-2xx responses map to `Error::Http`.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = ApiRequest::post(path, encode(body)?);
        handle_json_response(self.execute(request).await?).await
    }

    /// # Errors
    ///
    /// See [`RequestGate::execute`]; non-2xx responses map to `Error::Http`.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = ApiRequest::put(path, encode(body)?);
        handle_json_response(self.execute(request).await?).await
    }

    /// # Errors
    ///
    /// See [`RequestGate::execute`]; non-2xx responses map to `Error::Http`.
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = ApiRequest::patch(path, encode(body)?);
        handle_json_response(self.execute(request).await?).await
    }

    /// # Errors
    ///
    /// See [`RequestGate::execute`]; non-2xx responses map to `Error::Http`.
    pub async fn delete(&self, path: &str) -> Result<()> {
        handle_empty_response(self.execute(ApiRequest::delete(path)).await?).await
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|err| Error::Serialization(format!("Failed to encode request: {err}")))
}
