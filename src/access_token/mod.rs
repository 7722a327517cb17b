// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Arianee access tokens.
//!
//! ## Wire format
//!
//! ```text
//! base64url(header_json) . base64url(payload_json) . 0x<65-byte signature hex>
//! ```
//!
//! The signature is an EIP-191 `personal_sign` by the issuer over the
//! string `"<header segment>.<payload segment>"`. It is not a standard JWT:
//! the algorithm tag is `secp256k1` and verification recovers the signer
//! address instead of checking against a shared key.
//!
//! Two scopes exist:
//!
//! | `sub` | Extra claims | Issued by |
//! |-------|--------------|-----------|
//! | `wallet` | optional `id`, `network` | [`ArianeeAccessToken::get_valid_wallet_access_token`] |
//! | `certificate` | `subId`, `network`, optional `permit` + `permitSig` | [`ArianeeAccessToken::create_certificate_arianee_access_token`] |

mod jwt;
mod manager;

pub use jwt::{
    decode_jwt, is_arianee_access_token_valid, verify_access_token, AccessTokenHeader,
    AccessTokenPayload, DecodedAccessToken, TOKEN_ALGORITHM, TOKEN_TYPE,
};
pub use manager::{ArianeeAccessToken, PayloadOverrides, WalletTokenOptions};

/// `sub` claim of wallet-scoped tokens.
pub const SUBJECT_WALLET: &str = "wallet";

/// `sub` claim of certificate-scoped tokens.
pub const SUBJECT_CERTIFICATE: &str = "certificate";
