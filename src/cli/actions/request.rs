//! Generic gated call against the backend.

use crate::{
    api::{gate::RequestGate, handle_optional_json_response, ApiRequest},
    cli::actions::session::{connect, print_json},
    config::ClientConfig,
};
use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub method: Method,
    pub path: String,
    pub data: Option<Value>,
}

/// # Errors
/// Returns an error if the session cannot be authenticated or the call fails.
pub async fn execute(args: Args) -> Result<()> {
    let session = connect(&args.config)?;
    session
        .ensure_authenticated()
        .await
        .context("not signed in, run `gatekeep login` first")?;

    let gate = RequestGate::new(session);
    let request = ApiRequest {
        method: args.method,
        path: args.path,
        body: args.data,
    };

    if let Some(data) = send(&gate, request).await? {
        print_json(&data)?;
    }
    Ok(())
}

/// Runs `request` through the gate and returns the unwrapped `data`, if any.
///
/// # Errors
/// Returns an error if the call fails or the response cannot be decoded.
pub async fn send(gate: &RequestGate, request: ApiRequest) -> Result<Option<Value>> {
    let response = gate.execute(request).await?;
    Ok(handle_optional_json_response(response).await?)
}
