// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privacy gateway authentication modes.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::access_token::{ArianeeAccessToken, WalletTokenOptions};
use crate::error::ArianeeResult;
use crate::signing::{Core, SignedMessage, SigningIdentity};

/// The `authentification` member of a gateway request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Authentication {
    Bearer { bearer: String },
    Message { message: String, signature: String },
}

impl From<SignedMessage> for Authentication {
    fn from(signed: SignedMessage) -> Self {
        Authentication::Message {
            message: signed.message,
            signature: signed.signature,
        }
    }
}

/// How a client authenticates.
pub enum GatewayAuth<S> {
    /// Wallet access token derived from the identity, issued on first use
    /// and reused while valid.
    Identity(ArianeeAccessToken<Arc<S>>),
    /// Caller-supplied bearer token.
    Bearer(String),
    /// Caller-supplied message and signature, sent as is.
    MessageSignature(SignedMessage),
}

impl<S: SigningIdentity> GatewayAuth<S> {
    pub fn identity(identity: Arc<S>) -> Self {
        GatewayAuth::Identity(ArianeeAccessToken::in_memory(identity))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            GatewayAuth::Identity(_) => "identity",
            GatewayAuth::Bearer(_) => "bearer",
            GatewayAuth::MessageSignature(_) => "message/signature",
        }
    }

    pub fn is_bearer_like(&self) -> bool {
        !matches!(self, GatewayAuth::MessageSignature(_))
    }

    pub(crate) async fn authentication(&self) -> ArianeeResult<Authentication> {
        match self {
            GatewayAuth::Identity(tokens) => {
                let bearer = tokens
                    .get_valid_wallet_access_token(WalletTokenOptions::default())
                    .await?;
                Ok(Authentication::Bearer { bearer })
            }
            GatewayAuth::Bearer(bearer) => Ok(Authentication::Bearer {
                bearer: bearer.clone(),
            }),
            GatewayAuth::MessageSignature(signed) => Ok(signed.clone().into()),
        }
    }
}

/// Sign a read challenge for `certificate_id` with the identity derived
/// from `passphrase`.
pub(crate) async fn passphrase_authentication(
    certificate_id: u64,
    passphrase: &str,
) -> ArianeeResult<Authentication> {
    let core = Core::from_passphrase(passphrase)?;
    let challenge = json!({
        "certificateId": certificate_id.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    });
    let signed = core.sign_message(&challenge.to_string()).await?;
    Ok(signed.into())
}
