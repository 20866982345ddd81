#![allow(dead_code)]

use anyhow::Result;
use base64ct::{Base64UrlUnpadded, Encoding};
use gatekeep::{
    ApiClient, AuthSession, MemoryTokenStore, RecordingNavigator, RequestGate, SessionState,
    TokenStore,
};
use serde_json::{json, Value};
use std::{
    net::TcpListener,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use wiremock::{MockServer, ResponseTemplate};

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Unsigned compact token with the given `exp`.
pub fn token_expiring_at(exp: i64) -> String {
    let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = Base64UrlUnpadded::encode_string(json!({ "sub": "1", "exp": exp }).to_string().as_bytes());
    format!("{header}.{payload}.c2ln")
}

pub fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data, "success": true }))
}

pub struct Client {
    pub session: Arc<AuthSession>,
    pub gate: RequestGate,
    pub store: Arc<MemoryTokenStore>,
    pub state: Arc<SessionState>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Client {
    pub fn new(server: &MockServer) -> Result<Self> {
        Self::with_store(server, Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_tokens(server: &MockServer, access: &str, refresh: &str) -> Result<Self> {
        let store = Arc::new(MemoryTokenStore::new());
        store.set("access_token", access);
        store.set("refresh_token", refresh);
        Self::with_store(server, store)
    }

    pub fn with_store(server: &MockServer, store: Arc<MemoryTokenStore>) -> Result<Self> {
        let state = Arc::new(SessionState::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let session = Arc::new(AuthSession::new(
            ApiClient::with_timeout(&server.uri(), Duration::from_secs(5))?,
            store.clone(),
            state.clone(),
            navigator.clone(),
        ));
        Ok(Self {
            gate: RequestGate::new(session.clone()),
            session,
            store,
            state,
            navigator,
        })
    }
}
