// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Smart-asset sharing tokens (SST).
//!
//! An SST is a certificate-scoped access token whose payload embeds a
//! Permit721 transfer permit and the owner's EIP-712 signature over it.
//! The owner issues it with [`SmartAssetSharingToken`]; a service holding
//! it validates or redeems it with [`ServiceProvider`]. The token is the
//! only channel between the two sides. Single use is enforced by the
//! permit nonce on chain.

pub mod permit;
pub mod registry;
pub mod service_provider;
pub mod token_provider;

pub use permit::{permit_domain, PermitData, PermitTransfer, PermittedToken};
pub use registry::{AssetContract, SmartAssetRegistry};
pub use service_provider::{IsValidSstOptions, ServiceProvider, SstValidation, ValidSst};
pub use token_provider::SmartAssetSharingToken;
