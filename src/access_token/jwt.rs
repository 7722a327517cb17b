// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encoding, decoding and verification of access tokens.

use alloy::primitives::Address;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::now_ms;
use crate::error::{ArianeeError, ArianeeResult};
use crate::signing::recover_message_signer;

/// `typ` header value.
pub const TOKEN_TYPE: &str = "JWT";

/// `alg` header value.
pub const TOKEN_ALGORITHM: &str = "secp256k1";

/// Token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenHeader {
    pub typ: String,
    pub alg: String,
}

impl Default for AccessTokenHeader {
    fn default() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: TOKEN_ALGORITHM.to_string(),
        }
    }
}

/// Token claims.
///
/// `exp` and `iat` are Unix timestamps in milliseconds. Claims this struct
/// does not name are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    /// Issuer address.
    pub iss: String,
    /// `wallet` or `certificate`.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_sig: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessTokenPayload {
    /// Issuer claim as an address.
    pub fn issuer(&self) -> ArianeeResult<Address> {
        self.iss
            .parse()
            .map_err(|e| ArianeeError::InvalidAddress(format!("iss '{}': {e}", self.iss)))
    }
}

/// A token split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAccessToken {
    pub header: AccessTokenHeader,
    pub payload: AccessTokenPayload,
    pub signature: String,
    /// `"<header segment>.<payload segment>"` exactly as received.
    pub signed_content: String,
}

/// Base64url-encode a JSON value into a token segment.
pub(crate) fn encode_segment<T: Serialize>(value: &T) -> ArianeeResult<String> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str, name: &str) -> ArianeeResult<T> {
    let bytes = Base64UrlUnpadded::decode_vec(segment.trim_end_matches('='))
        .map_err(|e| ArianeeError::MalformedToken(format!("{name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ArianeeError::MalformedToken(format!("{name} is not valid JSON: {e}")))
}

/// Split a token into header, payload and signature.
///
/// Only the structure is checked; use [`is_arianee_access_token_valid`] to
/// check the signature and expiry.
pub fn decode_jwt(token: &str) -> ArianeeResult<DecodedAccessToken> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ArianeeError::MalformedToken(
            "expected three '.' separated segments".to_string(),
        ));
    };

    if signature.is_empty() {
        return Err(ArianeeError::MalformedToken("signature is empty".to_string()));
    }

    Ok(DecodedAccessToken {
        header: decode_segment(header_b64, "header")?,
        payload: decode_segment(payload_b64, "payload")?,
        signature: signature.to_string(),
        signed_content: format!("{header_b64}.{payload_b64}"),
    })
}

/// Decode a token and check that its signature recovers to `iss`; when
/// `check_expiration` is set, also require `exp` to be in the future.
pub fn verify_access_token(
    token: &str,
    check_expiration: bool,
) -> ArianeeResult<DecodedAccessToken> {
    let decoded = decode_jwt(token)?;
    let issuer = decoded.payload.issuer()?;

    let signer = recover_message_signer(&decoded.signed_content, &decoded.signature)
        .map_err(|e| ArianeeError::InvalidAccessToken(e.to_string()))?;
    if signer != issuer {
        return Err(ArianeeError::InvalidAccessToken(format!(
            "signed by {signer}, issued by {issuer}"
        )));
    }

    if check_expiration {
        let now = now_ms();
        if decoded.payload.exp <= now {
            return Err(ArianeeError::InvalidAccessToken(format!(
                "expired at {} (now {now})",
                decoded.payload.exp
            )));
        }
    }

    Ok(decoded)
}

/// Whether `token` is well formed, signed by its issuer and not expired.
///
/// Never fails; every problem yields `false`.
pub fn is_arianee_access_token_valid(token: &str) -> bool {
    match verify_access_token(token, true) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "access token rejected");
            false
        }
    }
}
