// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and the wallet-token cache.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use super::jwt::{encode_segment, is_arianee_access_token_valid, AccessTokenHeader, AccessTokenPayload};
use super::{SUBJECT_CERTIFICATE, SUBJECT_WALLET};
use crate::cache::{InMemoryStore, KeyValueStore};
use crate::clock::now_ms;
use crate::config::{DEFAULT_CERTIFICATE_TOKEN_VALIDITY, DEFAULT_WALLET_TOKEN_VALIDITY};
use crate::error::{ArianeeError, ArianeeResult};
use crate::signing::SigningIdentity;

/// Claims merged over the generated payload right before signing.
pub type PayloadOverrides = Map<String, Value>;

/// Options for [`ArianeeAccessToken::get_valid_wallet_access_token`].
#[derive(Debug, Clone, Default)]
pub struct WalletTokenOptions {
    /// Optional user id (`id` claim).
    pub id: Option<String>,
    /// Optional network slug (`network` claim).
    pub network: Option<String>,
    /// Validity of a freshly issued token; defaults to the wallet validity.
    pub validity: Option<Duration>,
    /// Extra claims applied last.
    pub overrides: Option<PayloadOverrides>,
}

/// Issues access tokens signed by one identity.
///
/// Wallet tokens are cached in `store`, keyed by issuer, `id` and
/// `network`. Certificate tokens are never cached.
pub struct ArianeeAccessToken<S, K = Arc<InMemoryStore>> {
    identity: S,
    store: K,
    wallet_validity: Duration,
    certificate_validity: Duration,
}

impl<S: SigningIdentity> ArianeeAccessToken<S, Arc<InMemoryStore>> {
    /// Issuer with a private in-memory cache.
    pub fn in_memory(identity: S) -> Self {
        Self::new(identity, Arc::new(InMemoryStore::default()))
    }
}

impl<S: SigningIdentity, K: KeyValueStore> ArianeeAccessToken<S, K> {
    pub fn new(identity: S, store: K) -> Self {
        Self {
            identity,
            store,
            wallet_validity: DEFAULT_WALLET_TOKEN_VALIDITY,
            certificate_validity: DEFAULT_CERTIFICATE_TOKEN_VALIDITY,
        }
    }

    /// Override the default validity windows.
    pub fn with_validity(mut self, wallet: Duration, certificate: Duration) -> Self {
        self.wallet_validity = wallet;
        self.certificate_validity = certificate;
        self
    }

    pub fn identity(&self) -> &S {
        &self.identity
    }

    /// Return the cached wallet token for these options, or issue and cache
    /// a new one when none is cached or the cached one no longer verifies.
    pub async fn get_valid_wallet_access_token(
        &self,
        options: WalletTokenOptions,
    ) -> ArianeeResult<String> {
        let key = self.wallet_cache_key(&options);

        if let Some(token) = self.store.get(&key)? {
            if is_arianee_access_token_valid(&token) {
                debug!(cache_key = %key, "wallet access token served from cache");
                return Ok(token);
            }
            self.store.remove(&key)?;
        }

        let token = self.create_wallet_access_token(&options).await?;
        self.store.set(&key, token.clone())?;
        debug!(cache_key = %key, "wallet access token issued");
        Ok(token)
    }

    /// Drop the cached wallet token for these options.
    pub fn invalidate_wallet_access_token(&self, options: &WalletTokenOptions) -> ArianeeResult<()> {
        self.store.remove(&self.wallet_cache_key(options))
    }

    async fn create_wallet_access_token(&self, options: &WalletTokenOptions) -> ArianeeResult<String> {
        let validity = options.validity.unwrap_or(self.wallet_validity);
        let mut payload = self.base_payload(SUBJECT_WALLET, validity);
        payload.id = options.id.clone();
        payload.network = options.network.clone();

        self.sign_payload(payload, options.overrides.clone()).await
    }

    /// Issue a certificate-scoped token for `sub_id` on `network`.
    ///
    /// `overrides` are merged after every default claim, so they can replace
    /// `exp` or add `permit` / `permitSig`.
    pub async fn create_certificate_arianee_access_token(
        &self,
        sub_id: u64,
        network: &str,
        overrides: Option<PayloadOverrides>,
    ) -> ArianeeResult<String> {
        let mut payload = self.base_payload(SUBJECT_CERTIFICATE, self.certificate_validity);
        payload.sub_id = Some(sub_id);
        payload.network = Some(network.to_string());

        self.sign_payload(payload, overrides).await
    }

    fn base_payload(&self, subject: &str, validity: Duration) -> AccessTokenPayload {
        let iat = now_ms();
        let validity_ms = i64::try_from(validity.as_millis()).unwrap_or(i64::MAX);
        AccessTokenPayload {
            iss: self.identity.address().to_checksum(None),
            sub: subject.to_string(),
            exp: iat.saturating_add(validity_ms),
            iat,
            id: None,
            sub_id: None,
            network: None,
            permit: None,
            permit_sig: None,
            extra: Map::new(),
        }
    }

    async fn sign_payload(
        &self,
        payload: AccessTokenPayload,
        overrides: Option<PayloadOverrides>,
    ) -> ArianeeResult<String> {
        let mut claims = match serde_json::to_value(&payload)? {
            Value::Object(map) => map,
            other => {
                return Err(ArianeeError::MalformedToken(format!(
                    "payload serialized to {other}"
                )))
            }
        };
        if let Some(overrides) = overrides {
            claims.extend(overrides);
        }

        let header = encode_segment(&AccessTokenHeader::default())?;
        let body = encode_segment(&claims)?;
        let signed_content = format!("{header}.{body}");
        let signed = self.identity.sign_message(&signed_content).await?;

        Ok(format!("{signed_content}.{}", signed.signature))
    }

    fn wallet_cache_key(&self, options: &WalletTokenOptions) -> String {
        format!(
            "arianee-access-token:{:#x}:{}:{}:{}",
            self.identity.address(),
            SUBJECT_WALLET,
            options.id.as_deref().unwrap_or("-"),
            options.network.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use serde_json::json;

    use super::*;
    use crate::access_token::{decode_jwt, verify_access_token};
    use crate::signing::Core;

    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn issuer() -> ArianeeAccessToken<Core> {
        ArianeeAccessToken::in_memory(Core::from_private_key(HARDHAT_KEY).unwrap())
    }

    #[tokio::test]
    async fn fresh_wallet_token_is_valid_and_cached() {
        let tokens = issuer();
        let first = tokens
            .get_valid_wallet_access_token(WalletTokenOptions::default())
            .await
            .unwrap();
        assert!(is_arianee_access_token_valid(&first));

        let decoded = decode_jwt(&first).unwrap();
        assert_eq!(decoded.header, AccessTokenHeader::default());
        assert_eq!(decoded.payload.sub, "wallet");
        assert_eq!(decoded.payload.iss, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert!(decoded.payload.exp > decoded.payload.iat);

        let second = tokens
            .get_valid_wallet_access_token(WalletTokenOptions::default())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cache_is_keyed_by_id() {
        let tokens = issuer();
        let alice = tokens
            .get_valid_wallet_access_token(WalletTokenOptions {
                id: Some("alice".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let anonymous = tokens
            .get_valid_wallet_access_token(WalletTokenOptions::default())
            .await
            .unwrap();

        assert_ne!(alice, anonymous);
        assert_eq!(decode_jwt(&alice).unwrap().payload.id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn expired_cached_token_is_replaced() {
        let tokens = issuer();
        let stale = tokens
            .get_valid_wallet_access_token(WalletTokenOptions {
                validity: Some(Duration::ZERO),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!is_arianee_access_token_valid(&stale));

        let fresh = tokens
            .get_valid_wallet_access_token(WalletTokenOptions::default())
            .await
            .unwrap();
        assert_ne!(stale, fresh);
        assert!(is_arianee_access_token_valid(&fresh));
    }

    #[tokio::test]
    async fn invalidate_forces_reissue() {
        let tokens = issuer();
        let options = WalletTokenOptions::default();
        let first = tokens.get_valid_wallet_access_token(options.clone()).await.unwrap();
        tokens.invalidate_wallet_access_token(&options).unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = tokens.get_valid_wallet_access_token(options).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn expiry_boundary() {
        let tokens = issuer();
        let now = now_ms();

        let mut past = PayloadOverrides::new();
        past.insert("exp".into(), json!(now - 1));
        let expired = tokens
            .create_certificate_arianee_access_token(1, "testnet", Some(past))
            .await
            .unwrap();
        assert!(!is_arianee_access_token_valid(&expired));
        // still verifies when expiry is not checked
        assert!(verify_access_token(&expired, false).is_ok());

        let mut future = PayloadOverrides::new();
        future.insert("exp".into(), json!(now + 10 * 365 * 24 * 3600 * 1000));
        let valid = tokens
            .create_certificate_arianee_access_token(1, "testnet", Some(future))
            .await
            .unwrap();
        assert!(is_arianee_access_token_valid(&valid));
    }

    #[tokio::test]
    async fn certificate_token_claims_and_overrides() {
        let tokens = issuer();
        let mut overrides = PayloadOverrides::new();
        overrides.insert("permit".into(), json!({"nonce": "7"}));
        overrides.insert("permitSig".into(), json!("0xabc"));
        overrides.insert("network".into(), json!("polygon"));

        let token = tokens
            .create_certificate_arianee_access_token(983190220, "testnet", Some(overrides))
            .await
            .unwrap();
        let payload = decode_jwt(&token).unwrap().payload;

        assert_eq!(payload.sub, "certificate");
        assert_eq!(payload.sub_id, Some(983190220));
        // overrides win over defaults
        assert_eq!(payload.network.as_deref(), Some("polygon"));
        assert_eq!(payload.permit, Some(json!({"nonce": "7"})));
        assert_eq!(payload.permit_sig.as_deref(), Some("0xabc"));
        assert!(payload.exp - payload.iat <= 5 * 60 * 1000);
    }

    #[tokio::test]
    async fn tampering_invalidates() {
        let tokens = issuer();
        let token = tokens
            .create_certificate_arianee_access_token(1, "testnet", None)
            .await
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        // flip the last signature nibble
        let mut signature = parts[2].to_string();
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        let bad_signature = format!("{}.{}.{}", parts[0], parts[1], signature);
        assert!(!is_arianee_access_token_valid(&bad_signature));

        // re-encode the payload with a different subId
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let mut payload: Value = serde_json::from_slice(&engine.decode(parts[1]).unwrap()).unwrap();
        payload["subId"] = json!(2);
        let forged = engine.encode(serde_json::to_vec(&payload).unwrap());
        let bad_payload = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert!(decode_jwt(&bad_payload).is_ok());
        assert!(!is_arianee_access_token_valid(&bad_payload));
    }

    #[tokio::test]
    async fn round_trip_preserves_header_and_payload() {
        let tokens = issuer();
        let token = tokens
            .create_certificate_arianee_access_token(5, "mainnet", None)
            .await
            .unwrap();
        let decoded = decode_jwt(&token).unwrap();

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let segments: Vec<&str> = token.split('.').collect();
        let raw_header: Value = serde_json::from_slice(&engine.decode(segments[0]).unwrap()).unwrap();
        let raw_payload: Value = serde_json::from_slice(&engine.decode(segments[1]).unwrap()).unwrap();

        assert_eq!(serde_json::to_value(&decoded.header).unwrap(), raw_header);
        assert_eq!(serde_json::to_value(&decoded.payload).unwrap(), raw_payload);
        assert_eq!(decoded.signed_content, format!("{}.{}", segments[0], segments[1]));
        assert_eq!(decoded.signature, segments[2]);
    }
}
