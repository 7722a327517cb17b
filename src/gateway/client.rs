// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC client for a privacy gateway.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::auth::{passphrase_authentication, Authentication, GatewayAuth};
use crate::error::{ArianeeError, ArianeeResult};
use crate::fetch::{FetchLike, FetchRequest, HttpFetcher};
use crate::signing::{Core, SignedMessage, SigningIdentity};

/// JSON-RPC request id used for every gateway call.
const RPC_ID: u64 = 2;

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Reads and writes off-chain content (certificates, updates, messages,
/// events) on a privacy gateway. The gateway URL is given per call.
pub struct PrivacyGatewayClient<S = Core, F = HttpFetcher> {
    auth: GatewayAuth<S>,
    fetcher: F,
}

impl<S: SigningIdentity, F: FetchLike> PrivacyGatewayClient<S, F> {
    /// Authenticate with wallet access tokens issued by `identity`.
    pub fn with_identity(identity: Arc<S>, fetcher: F) -> Self {
        Self {
            auth: GatewayAuth::identity(identity),
            fetcher,
        }
    }

    pub fn new(auth: GatewayAuth<S>, fetcher: F) -> Self {
        Self { auth, fetcher }
    }

    pub fn auth(&self) -> &GatewayAuth<S> {
        &self.auth
    }

    pub async fn certificate_read(
        &self,
        rpc_url: &str,
        certificate_id: u64,
        passphrase: Option<&str>,
    ) -> ArianeeResult<Value> {
        let authentication = self.read_authentication(certificate_id, passphrase).await?;
        let mut params = Map::new();
        params.insert("certificateId".into(), json!(certificate_id.to_string()));
        self.call(rpc_url, "certificate.read", params, authentication).await
    }

    pub async fn certificate_create(
        &self,
        rpc_url: &str,
        certificate_id: u64,
        content: &Value,
    ) -> ArianeeResult<Value> {
        require_schema(content)?;
        let mut params = Map::new();
        params.insert("certificateId".into(), json!(certificate_id.to_string()));
        params.insert("json".into(), content.clone());
        let authentication = self.auth.authentication().await?;
        self.call(rpc_url, "certificate.create", params, authentication).await
    }

    pub async fn update_read(
        &self,
        rpc_url: &str,
        certificate_id: u64,
        passphrase: Option<&str>,
    ) -> ArianeeResult<Value> {
        let authentication = self.read_authentication(certificate_id, passphrase).await?;
        let mut params = Map::new();
        params.insert("certificateId".into(), json!(certificate_id.to_string()));
        self.call(rpc_url, "update.read", params, authentication).await
    }

    pub async fn update_create(
        &self,
        rpc_url: &str,
        certificate_id: u64,
        content: &Value,
    ) -> ArianeeResult<Value> {
        require_schema(content)?;
        let mut params = Map::new();
        params.insert("certificateId".into(), json!(certificate_id.to_string()));
        params.insert("json".into(), content.clone());
        let authentication = self.auth.authentication().await?;
        self.call(rpc_url, "update.create", params, authentication).await
    }

    /// Messages are only readable with identity or bearer authentication.
    pub async fn message_read(&self, rpc_url: &str, message_id: u64) -> ArianeeResult<Value> {
        if !self.auth.is_bearer_like() {
            return Err(ArianeeError::AuthModeUnsupported {
                operation: "read messages",
                mode: self.auth.mode(),
            });
        }
        let mut params = Map::new();
        params.insert("messageId".into(), json!(message_id.to_string()));
        let authentication = self.auth.authentication().await?;
        self.call(rpc_url, "message.read", params, authentication).await
    }

    pub async fn message_create(
        &self,
        rpc_url: &str,
        message_id: u64,
        content: &Value,
    ) -> ArianeeResult<Value> {
        let mut params = Map::new();
        params.insert("messageId".into(), json!(message_id.to_string()));
        params.insert("json".into(), content.clone());
        let authentication = self.auth.authentication().await?;
        self.call(rpc_url, "message.create", params, authentication).await
    }

    pub async fn event_read(
        &self,
        rpc_url: &str,
        certificate_id: u64,
        event_id: u64,
        passphrase: Option<&str>,
    ) -> ArianeeResult<Value> {
        let authentication = self.read_authentication(certificate_id, passphrase).await?;
        let mut params = Map::new();
        params.insert("certificateId".into(), json!(certificate_id.to_string()));
        params.insert("eventId".into(), json!(event_id.to_string()));
        self.call(rpc_url, "event.read", params, authentication).await
    }

    pub async fn event_create(
        &self,
        rpc_url: &str,
        event_id: u64,
        content: &Value,
    ) -> ArianeeResult<Value> {
        let mut params = Map::new();
        params.insert("eventId".into(), json!(event_id.to_string()));
        params.insert("json".into(), content.clone());
        let authentication = self.auth.authentication().await?;
        self.call(rpc_url, "event.create", params, authentication).await
    }

    async fn read_authentication(
        &self,
        certificate_id: u64,
        passphrase: Option<&str>,
    ) -> ArianeeResult<Authentication> {
        match passphrase {
            Some(passphrase) => passphrase_authentication(certificate_id, passphrase).await,
            None => self.auth.authentication().await,
        }
    }

    async fn call(
        &self,
        rpc_url: &str,
        method: &str,
        mut params: Map<String, Value>,
        authentication: Authentication,
    ) -> ArianeeResult<Value> {
        params.insert("authentification".into(), serde_json::to_value(authentication)?);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": RPC_ID,
        });

        debug!(rpc_url, method, "privacy gateway call");
        let response = self
            .fetcher
            .fetch(FetchRequest::post_json(rpc_url, &body)?)
            .await?
            .error_for_status(rpc_url)?;

        let envelope: RpcEnvelope = response.json()?;
        if let Some(error) = envelope.error {
            return Err(ArianeeError::Gateway {
                code: error.code,
                message: error.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| ArianeeError::ContentParse(format!("{method}: response has no result")))
    }
}

impl<F: FetchLike> PrivacyGatewayClient<Core, F> {
    /// Authenticate with a caller-supplied bearer token.
    pub fn with_bearer(bearer: impl Into<String>, fetcher: F) -> Self {
        Self::new(GatewayAuth::Bearer(bearer.into()), fetcher)
    }

    /// Authenticate with a caller-supplied message and signature.
    pub fn with_message_signature(signed: SignedMessage, fetcher: F) -> Self {
        Self::new(GatewayAuth::MessageSignature(signed), fetcher)
    }
}

fn require_schema(content: &Value) -> ArianeeResult<()> {
    match content.get("$schema") {
        Some(Value::String(schema)) if !schema.is_empty() => Ok(()),
        _ => Err(ArianeeError::MissingSchema),
    }
}
