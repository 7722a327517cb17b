// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protocol details: what a slug resolves to.
//!
//! JSON keys follow the deployed API, including its historical
//! `contractAdresses` spelling (`contractAddresses` is accepted too).

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ArianeeError, ArianeeResult};

/// Contract roles of a V1 (1.x) deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddressesV1 {
    pub aria: Address,
    pub credit_history: Address,
    pub event_arianee: Address,
    pub identity: Address,
    pub smart_asset: Address,
    pub store: Address,
    pub whitelist: Address,
    pub lost: Address,
    pub message: Address,
    pub user_action: Address,
    pub update_smart_assets: Address,
    /// Present from protocol 1.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_proxy: Option<Address>,
    /// Present from protocol 1.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_note_pool: Option<Address>,
}

/// Contract roles of a V2 deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddressesV2 {
    pub nft: Address,
    pub ownership_registry: Address,
    pub event_hub: Address,
    pub message_hub: Address,
    pub rules_manager: Address,
    pub credit_manager: Address,
}

/// Interfaces a V2 NFT contract declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftInterfaces {
    #[serde(rename = "ERC721", default)]
    pub erc721: bool,
    #[serde(rename = "SmartAsset", default)]
    pub smart_asset: bool,
    #[serde(rename = "SmartAssetBurnable", default)]
    pub smart_asset_burnable: bool,
    #[serde(rename = "SmartAssetRecoverable", default)]
    pub smart_asset_recoverable: bool,
    #[serde(rename = "SmartAssetSoulbound", default)]
    pub smart_asset_soulbound: bool,
    #[serde(rename = "SmartAssetUpdatable", default)]
    pub smart_asset_updatable: bool,
    #[serde(rename = "SmartAssetURIStorage", default)]
    pub smart_asset_uri_storage: bool,
    #[serde(rename = "SmartAssetURIStorageOverridable", default)]
    pub smart_asset_uri_storage_overridable: bool,
}

impl NftInterfaces {
    /// Names of required interfaces that are not declared.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.erc721 {
            missing.push("ERC721".to_string());
        }
        if !self.smart_asset {
            missing.push("SmartAsset".to_string());
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetailsV1 {
    pub protocol_version: String,
    pub chain_id: u64,
    pub http_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_station: Option<String>,
    #[serde(rename = "contractAdresses", alias = "contractAddresses")]
    pub contract_addresses: ContractAddressesV1,
    #[serde(default)]
    pub soulbound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetailsV2 {
    pub protocol_version: String,
    pub chain_id: u64,
    pub http_provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_station: Option<String>,
    #[serde(rename = "contractAdresses", alias = "contractAddresses")]
    pub contract_addresses: ContractAddressesV2,
    #[serde(default)]
    pub nft_interfaces: NftInterfaces,
    #[serde(default)]
    pub soulbound: bool,
}

/// Resolved details, tagged by protocol generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProtocolDetails {
    V1(ProtocolDetailsV1),
    V2(ProtocolDetailsV2),
}

impl ProtocolDetails {
    /// Parse raw details, dispatching on the `protocolVersion` prefix.
    pub fn from_json(slug: &str, value: Value) -> ArianeeResult<Self> {
        let version = value
            .get("protocolVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| ArianeeError::ProtocolDetails {
                slug: slug.to_string(),
                reason: "missing protocolVersion".to_string(),
            })?
            .to_string();

        let invalid = |e: serde_json::Error| ArianeeError::ProtocolDetails {
            slug: slug.to_string(),
            reason: e.to_string(),
        };

        if version.starts_with('1') {
            serde_json::from_value(value).map(ProtocolDetails::V1).map_err(invalid)
        } else if version.starts_with('2') {
            serde_json::from_value(value).map(ProtocolDetails::V2).map_err(invalid)
        } else {
            Err(ArianeeError::UnsupportedProtocolVersion {
                slug: slug.to_string(),
                version,
            })
        }
    }

    pub fn protocol_version(&self) -> &str {
        match self {
            ProtocolDetails::V1(d) => &d.protocol_version,
            ProtocolDetails::V2(d) => &d.protocol_version,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            ProtocolDetails::V1(d) => d.chain_id,
            ProtocolDetails::V2(d) => d.chain_id,
        }
    }

    pub fn http_provider(&self) -> &str {
        match self {
            ProtocolDetails::V1(d) => &d.http_provider,
            ProtocolDetails::V2(d) => &d.http_provider,
        }
    }

    pub fn gas_station(&self) -> Option<&str> {
        match self {
            ProtocolDetails::V1(d) => d.gas_station.as_deref(),
            ProtocolDetails::V2(d) => d.gas_station.as_deref(),
        }
    }
}
