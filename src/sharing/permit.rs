// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer permits for the Permit721 contract.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::Eip712Domain,
};
use serde::{Deserialize, Serialize};

use crate::error::{ArianeeError, ArianeeResult, SstRejection};

sol! {
    #[sol(rpc)]
    interface IPermit721 {
        #[derive(Debug, PartialEq, Eq)]
        struct TokenPermissions {
            address token;
            uint256 tokenId;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct PermitTransferFrom {
            TokenPermissions permitted;
            address spender;
            uint256 nonce;
            uint256 deadline;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct SignatureTransferDetails {
            address to;
            uint256 requestedTokenId;
        }

        function permitTransferFrom(
            PermitTransferFrom memory permit,
            SignatureTransferDetails calldata transferDetails,
            address owner,
            bytes calldata signature
        ) external;
    }
}

pub use IPermit721::{PermitTransferFrom, SignatureTransferDetails, TokenPermissions};

/// EIP-712 domain name of the transfer contract.
pub const PERMIT_DOMAIN_NAME: &str = "Permit721";

/// Signing domain of `transfer_contract` on `chain_id`.
pub fn permit_domain(chain_id: u64, transfer_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(PERMIT_DOMAIN_NAME.into()),
        None,
        Some(U256::from(chain_id)),
        Some(transfer_contract),
        None,
    )
}

/// Permitted asset, as embedded in a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermittedToken {
    pub token: Address,
    pub token_id: u64,
}

/// JSON form of a [`PermitTransferFrom`].
///
/// `nonce` is a decimal string since it does not fit a JSON number;
/// `deadline` is in Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitData {
    pub permitted: PermittedToken,
    pub spender: Address,
    pub nonce: String,
    pub deadline: u64,
}

impl PermitData {
    pub fn new(token: Address, token_id: u64, spender: Address, nonce: U256, deadline: u64) -> Self {
        Self {
            permitted: PermittedToken { token, token_id },
            spender,
            nonce: nonce.to_string(),
            deadline,
        }
    }

    /// The typed struct that gets signed and submitted.
    pub fn to_typed(&self) -> ArianeeResult<PermitTransferFrom> {
        let nonce: U256 = self
            .nonce
            .parse()
            .map_err(|e| SstRejection::Malformed(format!("permit nonce '{}': {e}", self.nonce)))?;

        Ok(PermitTransferFrom {
            permitted: TokenPermissions {
                token: self.permitted.token,
                tokenId: U256::from(self.permitted.token_id),
            },
            spender: self.spender,
            nonce,
            deadline: U256::from(self.deadline),
        })
    }
}

/// Everything needed to call `permitTransferFrom`.
#[derive(Debug, Clone)]
pub struct PermitTransfer {
    pub transfer_contract: Address,
    pub permit: PermitTransferFrom,
    pub transfer_details: SignatureTransferDetails,
    pub owner: Address,
    pub signature: Bytes,
}

impl PermitTransfer {
    pub fn new(
        transfer_contract: Address,
        permit: &PermitData,
        to: Address,
        owner: Address,
        signature: Bytes,
    ) -> ArianeeResult<Self> {
        Ok(Self {
            transfer_contract,
            permit: permit.to_typed()?,
            transfer_details: SignatureTransferDetails {
                to,
                requestedTokenId: U256::from(permit.permitted.token_id),
            },
            owner,
            signature,
        })
    }

    /// ABI-encoded `permitTransferFrom` call data.
    pub fn calldata(&self) -> Bytes {
        use alloy::sol_types::SolCall;

        IPermit721::permitTransferFromCall {
            permit: self.permit.clone(),
            transferDetails: self.transfer_details.clone(),
            owner: self.owner,
            signature: self.signature.clone(),
        }
        .abi_encode()
        .into()
    }
}

/// Deserialize the `permit` claim of a token payload.
pub(crate) fn permit_from_claim(value: &serde_json::Value) -> ArianeeResult<PermitData> {
    serde_json::from_value(value.clone())
        .map_err(|e| ArianeeError::from(SstRejection::Malformed(format!("permit: {e}"))))
}

#[cfg(test)]
mod tests {
    use alloy::sol_types::SolStruct;

    use super::*;

    fn sample() -> PermitData {
        PermitData::new(
            Address::repeat_byte(0x05),
            42,
            Address::repeat_byte(0x5e),
            U256::from(7u64) << 200,
            1_900_000_000,
        )
    }

    #[test]
    fn json_round_trip_keeps_large_nonce() {
        let permit = sample();
        let value = serde_json::to_value(&permit).unwrap();
        assert_eq!(value["permitted"]["tokenId"], 42);
        assert!(value["nonce"].is_string());

        let back = permit_from_claim(&value).unwrap();
        assert_eq!(back, permit);
        assert_eq!(back.to_typed().unwrap().nonce, U256::from(7u64) << 200);
    }

    #[test]
    fn bad_nonce_is_malformed() {
        let mut permit = sample();
        permit.nonce = "not a number".into();
        let err = permit.to_typed().unwrap_err();
        assert!(matches!(
            err,
            ArianeeError::SharingTokenRejected(SstRejection::Malformed(_))
        ));
    }

    #[test]
    fn signing_hash_depends_on_domain() {
        let typed = sample().to_typed().unwrap();
        let a = typed.eip712_signing_hash(&permit_domain(137, Address::repeat_byte(1)));
        let b = typed.eip712_signing_hash(&permit_domain(77, Address::repeat_byte(1)));
        assert_ne!(a, b);
    }

    #[test]
    fn calldata_uses_permit_transfer_selector() {
        let transfer = PermitTransfer::new(
            Address::repeat_byte(1),
            &sample(),
            Address::repeat_byte(2),
            Address::repeat_byte(3),
            Bytes::from(vec![0u8; 65]),
        )
        .unwrap();
        assert_eq!(&transfer.calldata()[..4], &[0x10, 0x5b, 0x68, 0x9e]);
        assert_eq!(transfer.transfer_details.requestedTokenId, U256::from(42));
    }
}
