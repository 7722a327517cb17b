// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner side: issuing smart-asset sharing tokens.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde_json::{json, Map};
use tracing::info;
use uuid::Uuid;

use super::permit::{permit_domain, PermitData};
use super::registry::SmartAssetRegistry;
use crate::access_token::ArianeeAccessToken;
use crate::clock::now_secs;
use crate::config::DEFAULT_SST_VALIDITY;
use crate::error::ArianeeResult;
use crate::signing::{signature_hex, SigningIdentity};

/// Issues sharing tokens for assets owned by one identity.
pub struct SmartAssetSharingToken<S, G> {
    tokens: ArianeeAccessToken<Arc<S>>,
    registry: G,
    transfer_contract: Address,
    validity: Duration,
}

impl<S: SigningIdentity, G: SmartAssetRegistry> SmartAssetSharingToken<S, G> {
    /// `transfer_contract` is the Permit721 deployment that will move the
    /// asset on redemption.
    pub fn new(identity: Arc<S>, registry: G, transfer_contract: Address) -> Self {
        Self {
            tokens: ArianeeAccessToken::in_memory(identity),
            registry,
            transfer_contract,
            validity: DEFAULT_SST_VALIDITY,
        }
    }

    /// Window between issuance and the permit deadline.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn transfer_contract(&self) -> Address {
        self.transfer_contract
    }

    /// Let `spender` take `token_id` through the transfer contract.
    ///
    /// Approves the transfer contract first when needed and waits for that
    /// approval to be mined before signing the permit.
    pub async fn generate_sst(
        &self,
        protocol: &str,
        token_id: u64,
        spender: Address,
    ) -> ArianeeResult<String> {
        let asset = self.registry.asset_contract(protocol).await?;

        let approved = self.registry.get_approved(protocol, token_id).await?;
        if approved != self.transfer_contract {
            info!(
                protocol,
                token_id,
                transfer_contract = %self.transfer_contract,
                "approving transfer contract"
            );
            self.registry
                .approve(protocol, self.transfer_contract, token_id)
                .await?;
        }

        let deadline = now_secs().saturating_add(self.validity.as_secs());
        let nonce = U256::from(Uuid::new_v4().as_u128());
        let permit = PermitData::new(asset.address, token_id, spender, nonce, deadline);

        let domain = permit_domain(asset.chain_id, self.transfer_contract);
        let signature = self
            .tokens
            .identity()
            .sign_typed_data(&permit.to_typed()?, &domain)
            .await?;

        let mut overrides = Map::new();
        overrides.insert("permit".into(), serde_json::to_value(&permit)?);
        overrides.insert("permitSig".into(), json!(signature_hex(&signature)));
        overrides.insert("exp".into(), json!(deadline.saturating_mul(1000)));

        let sst = self
            .tokens
            .create_certificate_arianee_access_token(token_id, protocol, Some(overrides))
            .await?;
        info!(protocol, token_id, %spender, deadline, "sharing token issued");
        Ok(sst)
    }
}
