// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protocol resolution and contract bindings.
//!
//! A protocol slug (`"testnet"`, `"mainnet"`, ...) resolves to
//! [`ProtocolDetails`] through a pluggable [`ProtocolDetailsResolver`].
//! [`ProtocolClient::connect`] turns those details into a
//! [`ProtocolConnection`], which is either a V1 or a V2 deployment with one
//! contract binding per role. State-changing calls are signed through the
//! client's [`SigningIdentity`](crate::signing::SigningIdentity) by an
//! [`IdentitySigner`].

pub mod connection;
pub mod contracts;
pub mod details;
pub mod gas;
pub mod resolver;
pub mod signer;

pub use connection::{
    ProtocolClient, ProtocolClientOptions, ProtocolConnection, ProtocolV1Connection,
    ProtocolV2Connection, V1Contracts, V2Contracts,
};
pub use details::{
    ContractAddressesV1, ContractAddressesV2, NftInterfaces, ProtocolDetails, ProtocolDetailsV1,
    ProtocolDetailsV2,
};
pub use gas::{GasPrice, GasStation};
pub use resolver::{ApiProtocolDetailsResolver, ProtocolDetailsResolver, StaticProtocolDetailsResolver};
pub use signer::IdentitySigner;
