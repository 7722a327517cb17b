// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Call-data decoder over the known contract ABIs.
//!
//! The registry lists every contract of the three protocol generations in
//! order; the first function whose selector and argument layout both match
//! wins.

use std::sync::LazyLock;

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::Function,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ArianeeError, ArianeeResult};

/// A call matched against the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<Value>,
}

struct KnownContract {
    name: &'static str,
    functions: Vec<Function>,
}

const ARIANEE_STORE_V1: &[&str] = &[
    "function buyCredit(uint256 _creditType, uint256 _quantity, address _to)",
    "function reserveToken(uint256 _id, address _to, uint256 _rewards)",
    "function hydrateToken(uint256 _tokenId, bytes32 _imprint, string _uri, address _encryptedInitialKey, uint256 _tokenRecoveryTimestamp, bool _initialKeyIsRequestKey, address _providerBrand)",
    "function requestToken(uint256 _tokenId, bytes32 _hash, bool _keepRequestToken, address _providerOwner, bytes _signature)",
    "function createEvent(uint256 _eventId, uint256 _tokenId, bytes32 _imprint, string _uri, address _providerBrand)",
    "function acceptEvent(uint256 _eventId, address _providerOwner)",
    "function refuseEvent(uint256 _eventId, address _providerOwner)",
    "function createMessage(uint256 _messageId, uint256 _tokenId, bytes32 _imprint, address _providerBrand)",
    "function updateSmartAsset(uint256 _tokenId, bytes32 _imprint, address _providerBrand)",
];

const ARIANEE_SMART_ASSET_V1: &[&str] = &[
    "function approve(address _approved, uint256 _tokenId)",
    "function transferFrom(address _from, address _to, uint256 _tokenId)",
    "function safeTransferFrom(address _from, address _to, uint256 _tokenId)",
    "function setApprovalForAll(address _operator, bool _approved)",
    "function addTokenAccess(uint256 _tokenId, address _key, bool _enable, uint256 _tokenType)",
    "function updateRecoveryRequest(uint256 _tokenId, bool _active)",
    "function recoverTokenToIssuer(uint256 _tokenId)",
    "function destroy(uint256 _tokenId)",
];

const ARIANEE_IDENTITY_V1: &[&str] = &[
    "function updateInformations(string _uri, bytes32 _imprint)",
    "function addAddressToApprovedList(address _newIdentity)",
    "function removeAddressFromApprovedList(address _identity)",
];

const ARIANEE_LOST_V1: &[&str] = &[
    "function setMissingStatus(uint256 _tokenId)",
    "function unsetMissingStatus(uint256 _tokenId)",
    "function setStolenStatus(uint256 _tokenId)",
    "function unsetStolenStatus(uint256 _tokenId)",
];

const ARIANEE_USER_ACTION_V1: &[&str] = &[
    "function addAddressToWhitelist(uint256 _tokenId, address _address)",
];

const ARIA_V1: &[&str] = &[
    "function transfer(address _to, uint256 _value)",
    "function approve(address _spender, uint256 _value)",
];

const ARIANEE_ISSUER_PROXY_V1_5: &[&str] = &[
    "function addCreditFreeSender(address _sender)",
    "function removeCreditFreeSender(address _sender)",
    "function updateSmartAsset((uint256[2],uint256[2][2],uint256[2],uint256[3]) _ownershipProof, bytes _creditNotePool, uint256 _tokenId, bytes32 _imprint, address _interfaceProvider)",
    "function createEvent((uint256[2],uint256[2][2],uint256[2],uint256[3]) _ownershipProof, bytes _creditNotePool, uint256 _tokenId, uint256 _eventId, bytes32 _imprint, string _uri, address _interfaceProvider)",
    "function createMessage((uint256[2],uint256[2][2],uint256[2],uint256[3]) _ownershipProof, uint256 _messageId, uint256 _tokenId, bytes32 _imprint, address _interfaceProvider)",
];

const ARIANEE_CREDIT_NOTE_POOL_V1_5: &[&str] = &[
    "function purchase(bytes32 _commitmentHash, uint256 _zkCreditType)",
];

const ARIANEE_SMART_ASSET_V2: &[&str] = &[
    "function mint(uint256 tokenId, bytes32 imprint, string uri, address initialKey, uint256 tokenRecoveryTimestamp, bool initialKeyIsRequestKey, address protocolOwner)",
    "function setTokenURI(uint256 tokenId, string uri)",
    "function updateImprint(uint256 tokenId, bytes32 imprint)",
    "function burn(uint256 tokenId)",
];

const ARIANEE_EVENT_HUB_V2: &[&str] = &[
    "function createEvent(address nft, uint256 eventId, uint256 tokenId, bytes32 imprint, string uri)",
    "function acceptEvent(address nft, uint256 eventId)",
    "function refuseEvent(address nft, uint256 eventId)",
];

const ARIANEE_MESSAGE_HUB_V2: &[&str] = &[
    "function sendMessage(address nft, uint256 messageId, uint256 tokenId, bytes32 imprint)",
    "function markAsRead(uint256 messageId)",
];

const PERMIT_721_V2: &[&str] = &[
    "function permitTransferFrom(((address,uint256),address,uint256,uint256) permit, (address,uint256) transferDetails, address owner, bytes signature)",
];

static REGISTRY: LazyLock<Vec<KnownContract>> = LazyLock::new(|| {
    [
        ("ArianeeStore_v1", ARIANEE_STORE_V1),
        ("ArianeeSmartAsset_v1", ARIANEE_SMART_ASSET_V1),
        ("ArianeeIdentity_v1", ARIANEE_IDENTITY_V1),
        ("ArianeeLost_v1", ARIANEE_LOST_V1),
        ("ArianeeUserAction_v1", ARIANEE_USER_ACTION_V1),
        ("Aria_v1", ARIA_V1),
        ("ArianeeIssuerProxy_v1_5", ARIANEE_ISSUER_PROXY_V1_5),
        ("ArianeeCreditNotePool_v1_5", ARIANEE_CREDIT_NOTE_POOL_V1_5),
        ("ArianeeSmartAsset_v2", ARIANEE_SMART_ASSET_V2),
        ("ArianeeEventHub_v2", ARIANEE_EVENT_HUB_V2),
        ("ArianeeMessageHub_v2", ARIANEE_MESSAGE_HUB_V2),
        ("Permit721_v2", PERMIT_721_V2),
    ]
    .into_iter()
    .map(|(name, signatures)| KnownContract {
        name,
        functions: signatures
            .iter()
            .filter_map(|signature| match Function::parse(signature) {
                Ok(function) => Some(function),
                Err(e) => {
                    warn!(contract = name, signature, error = %e, "skipping unparsable signature");
                    None
                }
            })
            .collect(),
    })
    .collect()
});

/// Decode `0x`-prefixed (or bare) hex call data.
pub fn decode_transaction_hex(data: &str) -> ArianeeResult<DecodedTransaction> {
    let bytes = alloy::hex::decode(data.trim()).map_err(|_| ArianeeError::NoMatchingInterface)?;
    decode_transaction(&bytes)
}

/// Match raw call data against the registry.
pub fn decode_transaction(data: &[u8]) -> ArianeeResult<DecodedTransaction> {
    let Some((selector, arguments)) = data.split_first_chunk::<4>() else {
        return Err(ArianeeError::NoMatchingInterface);
    };

    for contract in REGISTRY.iter() {
        for function in &contract.functions {
            if function.selector().0 != *selector {
                continue;
            }
            if let Ok(values) = function.abi_decode_input(arguments) {
                return Ok(DecodedTransaction {
                    contract_name: contract.name.to_string(),
                    function_name: function.name.clone(),
                    function_args: values.iter().map(to_json).collect(),
                });
            }
        }
    }

    Err(ArianeeError::NoMatchingInterface)
}

fn to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Uint(n, _) => Value::String(n.to_string()),
        DynSolValue::Int(n, _) => Value::String(n.to_string()),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", alloy::hex::encode(&word[..*size])))
        }
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", alloy::hex::encode(bytes))),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Function(f) => Value::String(format!("0x{}", alloy::hex::encode(f.as_slice()))),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(to_json).collect())
        }
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{other:?}")),
    }
}
