// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local-key signing identity.

use std::fmt;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, Signature, B256},
    rpc::types::TransactionRequest,
    signers::{
        local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
        Signer,
    },
};
use k256::{ecdsa::SigningKey, elliptic_curve::rand_core::OsRng};

use super::{pem::secret_key_from_pem, signature_hex, SignedMessage, SigningIdentity};
use crate::error::{ArianeeError, ArianeeResult};

/// Signing identity holding a secp256k1 key in process memory.
#[derive(Clone)]
pub struct Core {
    signer: PrivateKeySigner,
}

impl Core {
    /// Build from a hex private key, with or without `0x`.
    pub fn from_private_key(private_key_hex: &str) -> ArianeeResult<Self> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| ArianeeError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ArianeeError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self { signer })
    }

    /// Build from a BIP-39 English mnemonic, account index 0
    /// (`m/44'/60'/0'/0/0`).
    pub fn from_mnemonic(phrase: &str) -> ArianeeResult<Self> {
        Self::from_mnemonic_index(phrase, 0)
    }

    /// Build from a BIP-39 English mnemonic at `m/44'/60'/0'/0/<index>`.
    pub fn from_mnemonic_index(phrase: &str, index: u32) -> ArianeeResult<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .index(index)
            .map_err(|e| ArianeeError::InvalidMnemonic(e.to_string()))?
            .build()
            .map_err(|e| ArianeeError::InvalidMnemonic(e.to_string()))?;

        Ok(Self { signer })
    }

    /// Deterministic identity derived from a certificate passphrase.
    ///
    /// The private key is the UTF-8 bytes of the passphrase, left-padded
    /// with zeros to 32 bytes.
    pub fn from_passphrase(passphrase: &str) -> ArianeeResult<Self> {
        let bytes = passphrase.as_bytes();
        if bytes.is_empty() {
            return Err(ArianeeError::InvalidPassphrase("passphrase is empty".into()));
        }
        if bytes.len() > 32 {
            return Err(ArianeeError::InvalidPassphrase(format!(
                "passphrase is {} bytes, at most 32 allowed",
                bytes.len()
            )));
        }

        let mut key = [0u8; 32];
        key[32 - bytes.len()..].copy_from_slice(bytes);

        let signer = PrivateKeySigner::from_slice(&key)
            .map_err(|e| ArianeeError::InvalidPassphrase(e.to_string()))?;

        Ok(Self { signer })
    }

    /// Build from a SEC1 or PKCS#8 PEM encoded key.
    pub fn from_pem(pem_bytes: &[u8]) -> ArianeeResult<Self> {
        let secret = secret_key_from_pem(pem_bytes)?;
        let signer = PrivateKeySigner::from_signing_key(SigningKey::from(secret));
        Ok(Self { signer })
    }

    /// Fresh identity from the OS random number generator.
    pub fn random() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self {
            signer: PrivateKeySigner::from_signing_key(signing_key),
        }
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl SigningIdentity for Core {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &str) -> ArianeeResult<SignedMessage> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| ArianeeError::Signing(e.to_string()))?;

        Ok(SignedMessage {
            message: message.to_string(),
            signature: signature_hex(&signature),
        })
    }

    async fn sign_hash(&self, hash: B256) -> ArianeeResult<Signature> {
        self.signer
            .sign_hash(&hash)
            .await
            .map_err(|e| ArianeeError::Signing(e.to_string()))
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> ArianeeResult<Bytes> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &wallet)
            .await
            .map_err(|e| ArianeeError::Signing(e.to_string()))?;

        Ok(Bytes::from(envelope.encoded_2718()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{pem::tests::HARDHAT_SEC1_PEM, recover_message_signer};

    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const HARDHAT_MNEMONIC: &str = "test test test test test test test test test test test junk";
    const HARDHAT_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const HARDHAT_HELLO_SIGNATURE: &str = "0xf16ea9a3478698f695fd1401bfe27e9e4a7e8e3da94aa72b021125e31fa899cc573c48ea3fe1d4ab61a9db10c19032026e3ed2dbccba5a178235ac27f94504311c";

    const PASSPHRASE: &str = "kj1ed3hq3a4y";
    const PASSPHRASE_ADDRESS: &str = "0x0746935b4E3dba6b5c8Eb012EA4BCDd97Bdd9Fb2";
    const PASSPHRASE_HELLO_SIGNATURE: &str = "0x985888703383469e64ce8e2486577d2049e938d03723228468a783a7e45df28f3f1efd31a7a660f4142834dbb00a27799ff3ea8df683f5d7663c8b596fb107eb1b";

    fn address(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn private_key_golden_vector() {
        let core = Core::from_private_key(HARDHAT_KEY).unwrap();
        assert_eq!(core.address(), address(HARDHAT_ADDRESS));

        let signed = core.sign_message("hello").await.unwrap();
        assert_eq!(signed.message, "hello");
        assert_eq!(signed.signature, HARDHAT_HELLO_SIGNATURE);
    }

    #[tokio::test]
    async fn mnemonic_golden_vector() {
        let core = Core::from_mnemonic(HARDHAT_MNEMONIC).unwrap();
        assert_eq!(core.address(), address(HARDHAT_ADDRESS));

        let signed = core.sign_message("hello").await.unwrap();
        assert_eq!(signed.signature, HARDHAT_HELLO_SIGNATURE);
    }

    #[tokio::test]
    async fn passphrase_golden_vector() {
        let core = Core::from_passphrase(PASSPHRASE).unwrap();
        assert_eq!(core.address(), address(PASSPHRASE_ADDRESS));

        let signed = core.sign_message("hello").await.unwrap();
        assert_eq!(signed.signature, PASSPHRASE_HELLO_SIGNATURE);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = Core::from_passphrase(PASSPHRASE).unwrap();
        let b = Core::from_passphrase(PASSPHRASE).unwrap();
        assert_eq!(a.address(), b.address());

        let c = Core::from_mnemonic_index(HARDHAT_MNEMONIC, 1).unwrap();
        assert_ne!(c.address(), a.address());
        assert_ne!(c.address(), address(HARDHAT_ADDRESS));
    }

    #[test]
    fn pem_matches_hex_key() {
        let core = Core::from_pem(HARDHAT_SEC1_PEM.as_bytes()).unwrap();
        assert_eq!(core.address(), address(HARDHAT_ADDRESS));
    }

    #[test]
    fn rejects_bad_key_material() {
        assert_eq!(
            Core::from_private_key("0xzz").unwrap_err().error_code(),
            "invalid_private_key"
        );
        assert_eq!(
            Core::from_mnemonic("not a real mnemonic").unwrap_err().error_code(),
            "invalid_mnemonic"
        );
        assert_eq!(
            Core::from_passphrase("").unwrap_err().error_code(),
            "invalid_passphrase"
        );
        assert_eq!(
            Core::from_passphrase(&"x".repeat(33)).unwrap_err().error_code(),
            "invalid_passphrase"
        );
    }

    #[tokio::test]
    async fn random_identities_sign_verifiably() {
        let core = Core::random();
        assert_ne!(core.address(), Core::random().address());

        let signed = core.sign_message("arianee").await.unwrap();
        let signer = recover_message_signer(&signed.message, &signed.signature).unwrap();
        assert_eq!(signer, core.address());
    }

    #[tokio::test]
    async fn signs_legacy_transaction() {
        let core = Core::from_private_key(HARDHAT_KEY).unwrap();
        let tx = TransactionRequest::default()
            .with_from(core.address())
            .with_to(address(PASSPHRASE_ADDRESS))
            .with_nonce(0)
            .with_chain_id(77)
            .with_gas_limit(21_000)
            .with_gas_price(1_000_000_000);

        let raw = core.sign_transaction(tx).await.unwrap();
        // legacy envelopes are bare RLP lists
        assert!(raw[0] >= 0xc0);
    }
}
