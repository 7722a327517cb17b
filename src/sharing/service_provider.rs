// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redeemer side: validating and consuming sharing tokens.
//!
//! Validation runs these checks in order and stops at the first failure:
//!
//! 1. parse: well formed and signed by its `iss` (token expiry is not checked)
//! 2. scope: certificate subject, network, permit for `subId`, permit signature
//! 3. expiry: permit deadline strictly after now
//! 4. contract: the permit targets the protocol's smart-asset contract
//! 5. permit signer: the permit was signed by `iss`
//! 6. owner: `iss` still owns the asset
//! 7. approval: the transfer contract is still approved for the asset
//! 8. dry run (optional): the transfer does not revert

use alloy::primitives::{address, Address, Bytes};
use serde::Serialize;
use tracing::debug;

use super::permit::{permit_domain, permit_from_claim, PermitData, PermitTransfer};
use super::registry::SmartAssetRegistry;
use crate::access_token::{verify_access_token, DecodedAccessToken, SUBJECT_CERTIFICATE};
use crate::clock::now_secs;
use crate::config::DEFAULT_SST_QUERY_KEY;
use crate::error::{ArianeeError, ArianeeResult, SstRejection};
use crate::signing::{parse_signature, recover_typed_data_signer};
use crate::transaction::TransactionOutcome;

/// Recipient used for dry runs.
pub const DRY_RUN_RECIPIENT: Address = address!("0x000000000000000000000000000000000000dEaD");

#[derive(Debug, Clone, Copy, Default)]
pub struct IsValidSstOptions {
    /// Return the rejection instead of `valid: false`.
    pub throw_on_error: bool,
    /// Simulate the transfer as the last check.
    pub perform_dry_run: bool,
}

/// A token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidSst {
    pub token_id: u64,
    pub network: String,
    pub owner: Address,
    pub permit: PermitData,
    pub permit_sig: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SstValidation {
    pub valid: bool,
    #[serde(flatten)]
    pub details: Option<ValidSst>,
}

/// Validates and redeems sharing tokens addressed to this service.
pub struct ServiceProvider<G> {
    registry: G,
    transfer_contract: Address,
}

impl<G: SmartAssetRegistry> ServiceProvider<G> {
    pub fn new(registry: G, transfer_contract: Address) -> Self {
        Self {
            registry,
            transfer_contract,
        }
    }

    /// Decode a sharing token and check its signature.
    pub fn parse_sst(&self, sst: &str) -> ArianeeResult<DecodedAccessToken> {
        verify_access_token(sst, false)
            .map_err(|e| ArianeeError::from(SstRejection::Malformed(e.to_string())))
    }

    /// Extract a sharing token from a service-provider URL.
    ///
    /// `key` defaults to `SST`.
    pub fn sst_from_url(url: &str, key: Option<&str>) -> ArianeeResult<Option<String>> {
        let key = key.unwrap_or(DEFAULT_SST_QUERY_KEY);
        let url = url::Url::parse(url).map_err(|e| ArianeeError::InvalidLink(e.to_string()))?;
        Ok(url
            .query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned()))
    }

    /// Run every check; failures yield `valid: false` unless
    /// `throw_on_error` is set.
    pub async fn is_valid_sst(
        &self,
        sst: &str,
        options: IsValidSstOptions,
    ) -> ArianeeResult<SstValidation> {
        match self.validate(sst, options.perform_dry_run).await {
            Ok(details) => Ok(SstValidation {
                valid: true,
                details: Some(details),
            }),
            Err(e) if options.throw_on_error => Err(e),
            Err(e) => {
                debug!(error = %e, code = e.error_code(), "sharing token rejected");
                Ok(SstValidation {
                    valid: false,
                    details: None,
                })
            }
        }
    }

    /// Validate `sst` and move the asset to `to` through the transfer
    /// contract. Rejections always propagate.
    pub async fn transfer_smart_asset(
        &self,
        sst: &str,
        to: Address,
        perform_dry_run: bool,
    ) -> ArianeeResult<TransactionOutcome> {
        let valid = self.validate(sst, false).await?;
        let transfer = self.permit_transfer(&valid, to)?;

        if perform_dry_run {
            self.registry
                .simulate_permit_transfer(&valid.network, &transfer)
                .await
                .map_err(|e| SstRejection::DryRunFailed(e.to_string()))?;
        }

        self.registry
            .submit_permit_transfer(&valid.network, &transfer)
            .await
    }

    fn permit_transfer(&self, valid: &ValidSst, to: Address) -> ArianeeResult<PermitTransfer> {
        let signature = Bytes::from(parse_signature(&valid.permit_sig)?.as_bytes().to_vec());
        PermitTransfer::new(self.transfer_contract, &valid.permit, to, valid.owner, signature)
    }

    async fn validate(&self, sst: &str, perform_dry_run: bool) -> ArianeeResult<ValidSst> {
        let token = self.parse_sst(sst)?;
        let payload = token.payload;

        if payload.sub != SUBJECT_CERTIFICATE {
            return Err(SstRejection::NotCertificateScoped(payload.sub).into());
        }
        let network = payload.network.clone().ok_or(SstRejection::MissingNetwork)?;
        let permit = permit_from_claim(payload.permit.as_ref().ok_or(SstRejection::MissingPermit)?)?;
        if payload.sub_id != Some(permit.permitted.token_id) {
            return Err(SstRejection::TokenIdMismatch {
                permit_token_id: permit.permitted.token_id,
                sub_id: payload.sub_id,
            }
            .into());
        }
        let permit_sig = payload
            .permit_sig
            .clone()
            .ok_or(SstRejection::MissingPermitSignature)?;

        let now = now_secs();
        // A deadline equal to `now` is rejected here, although other Arianee SDKs still accept it.
        if permit.deadline <= now {
            return Err(SstRejection::PermitExpired {
                deadline: permit.deadline,
                now,
            }
            .into());
        }

        let asset = self.registry.asset_contract(&network).await?;
        if permit.permitted.token != asset.address {
            return Err(SstRejection::TokenContractMismatch {
                permitted: permit.permitted.token,
                expected: asset.address,
            }
            .into());
        }

        let issuer = payload.issuer()?;
        let domain = permit_domain(asset.chain_id, self.transfer_contract);
        let signer = recover_typed_data_signer(&permit.to_typed()?, &domain, &permit_sig)
            .map_err(|e| SstRejection::Malformed(format!("permit signature: {e}")))?;
        if signer != issuer {
            return Err(SstRejection::PermitSignerMismatch { signer, issuer }.into());
        }

        let token_id = permit.permitted.token_id;
        let owner = self.registry.owner_of(&network, token_id).await?;
        if owner != issuer {
            return Err(SstRejection::OwnerMismatch { owner, issuer }.into());
        }

        let approved = self.registry.get_approved(&network, token_id).await?;
        if approved != self.transfer_contract {
            return Err(SstRejection::TransferNotApproved {
                approved,
                expected: self.transfer_contract,
            }
            .into());
        }

        let valid = ValidSst {
            token_id,
            network,
            owner,
            permit,
            permit_sig,
        };

        if perform_dry_run {
            let transfer = self.permit_transfer(&valid, DRY_RUN_RECIPIENT)?;
            self.registry
                .simulate_permit_transfer(&valid.network, &transfer)
                .await
                .map_err(|e| SstRejection::DryRunFailed(e.to_string()))?;
        }

        Ok(valid)
    }
}
