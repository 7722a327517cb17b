// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Arianee SDK - Smart-Asset Protocol Core
//!
//! Client-side plumbing for the Arianee smart-asset protocol: resolving a
//! protocol deployment by slug, calling its V1 or V2 contract suite,
//! signing access tokens, issuing and redeeming smart-asset sharing tokens
//! and talking to privacy gateways.
//!
//! ## Modules
//!
//! - `signing` - identities (private key, mnemonic, passphrase, PEM)
//! - `access_token` - secp256k1-signed JWT-like access tokens
//! - `protocol` - protocol details resolution and typed connections
//! - `transaction` - call/transaction wrappers and calldata decoding
//! - `sharing` - smart-asset sharing tokens (Permit721)
//! - `gateway` - privacy gateway JSON-RPC client
//! - `fetch` - HTTP layer with timeout, retry and response caching
//! - `cache` - key/value stores (memory, redb)
//! - `link` - certificate deep links

pub mod access_token;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod link;
pub mod logging;
pub mod protocol;
pub mod sharing;
pub mod signing;
pub mod transaction;

pub use access_token::ArianeeAccessToken;
pub use error::{ArianeeError, ArianeeResult, SstRejection};
pub use gateway::PrivacyGatewayClient;
pub use protocol::{ProtocolClient, ProtocolConnection};
pub use sharing::{ServiceProvider, SmartAssetSharingToken};
pub use signing::{Core, SigningIdentity};
