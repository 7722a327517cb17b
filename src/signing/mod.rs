// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing identities.
//!
//! A [`SigningIdentity`] is anything that can report an address and sign
//! messages, EIP-712 typed data and transactions. Everything above this
//! module (access tokens, protocol connections, sharing tokens) is generic
//! over it; [`Core`] is the local-key implementation.

pub mod local;
pub mod pem;

use std::future::Future;
use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, Signature, B256},
    rpc::types::TransactionRequest,
    sol_types::{Eip712Domain, SolStruct},
};
use serde::{Deserialize, Serialize};

use crate::error::{ArianeeError, ArianeeResult};

pub use local::Core;

/// A message together with its EIP-191 signature (`0x`-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: String,
    pub signature: String,
}

/// An entity able to sign on behalf of one address.
///
/// The address is a pure function of the key material and never changes.
pub trait SigningIdentity: Send + Sync {
    fn address(&self) -> Address;

    /// EIP-191 `personal_sign` over the UTF-8 bytes of `message`.
    fn sign_message(&self, message: &str) -> impl Future<Output = ArianeeResult<SignedMessage>>;

    /// Raw secp256k1 signature over a 32-byte digest.
    fn sign_hash(&self, hash: B256) -> impl Future<Output = ArianeeResult<Signature>>;

    /// Sign a fully populated transaction request and return the
    /// EIP-2718 encoded envelope, ready for `eth_sendRawTransaction`.
    fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> impl Future<Output = ArianeeResult<Bytes>>;

    /// EIP-712 signature over `value` in `domain`.
    fn sign_typed_data<T: SolStruct>(
        &self,
        value: &T,
        domain: &Eip712Domain,
    ) -> impl Future<Output = ArianeeResult<Signature>> {
        self.sign_hash(value.eip712_signing_hash(domain))
    }
}

impl<S: SigningIdentity> SigningIdentity for Arc<S> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn sign_message(&self, message: &str) -> impl Future<Output = ArianeeResult<SignedMessage>> {
        (**self).sign_message(message)
    }

    fn sign_hash(&self, hash: B256) -> impl Future<Output = ArianeeResult<Signature>> {
        (**self).sign_hash(hash)
    }

    fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> impl Future<Output = ArianeeResult<Bytes>> {
        (**self).sign_transaction(tx)
    }
}

/// Render a signature as `0x` + r || s || v, with v in {27, 28}.
pub fn signature_hex(signature: &Signature) -> String {
    format!("0x{}", alloy::hex::encode(signature.as_bytes()))
}

/// Parse a 65-byte hex signature (with or without `0x`).
pub fn parse_signature(signature: &str) -> ArianeeResult<Signature> {
    let bytes = alloy::hex::decode(signature)
        .map_err(|e| ArianeeError::Signing(format!("signature is not hex: {e}")))?;
    Signature::from_raw(&bytes)
        .map_err(|e| ArianeeError::Signing(format!("invalid signature: {e}")))
}

/// Address that produced an EIP-191 signature over `message`.
pub fn recover_message_signer(message: &str, signature: &str) -> ArianeeResult<Address> {
    parse_signature(signature)?
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| ArianeeError::Signing(format!("signer recovery failed: {e}")))
}

/// Address that produced an EIP-712 signature over `value` in `domain`.
pub fn recover_typed_data_signer<T: SolStruct>(
    value: &T,
    domain: &Eip712Domain,
    signature: &str,
) -> ArianeeResult<Address> {
    let hash = value.eip712_signing_hash(domain);
    parse_signature(signature)?
        .recover_address_from_prehash(&hash)
        .map_err(|e| ArianeeError::Signing(format!("signer recovery failed: {e}")))
}
