// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction submission through a [`SigningIdentity`].
//!
//! [`IdentitySigner`] holds the identity and the provider side by side.
//! It fills the missing transaction fields from the chain, signs locally
//! through the identity and submits the raw envelope; the provider never
//! sees key material.

use std::sync::Arc;

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, PendingTransactionBuilder, Provider},
    rpc::types::TransactionRequest,
};
use tracing::{debug, warn};

use super::gas::{GasPrice, GasStation};
use crate::error::{ArianeeError, ArianeeResult};
use crate::signing::{SignedMessage, SigningIdentity};

/// Signing adapter bound to one chain.
pub struct IdentitySigner<S> {
    identity: Arc<S>,
    provider: DynProvider,
    chain_id: u64,
    gas_station: Option<GasStation>,
    legacy_transactions: bool,
}

impl<S: SigningIdentity> IdentitySigner<S> {
    pub fn new(
        identity: Arc<S>,
        provider: DynProvider,
        chain_id: u64,
        gas_station: Option<GasStation>,
        legacy_transactions: bool,
    ) -> Self {
        Self {
            identity,
            provider,
            chain_id,
            gas_station,
            legacy_transactions,
        }
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn identity(&self) -> &Arc<S> {
        &self.identity
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Whether transactions are forced to type 0.
    pub fn uses_legacy_transactions(&self) -> bool {
        self.legacy_transactions
    }

    pub async fn sign_message(&self, message: &str) -> ArianeeResult<SignedMessage> {
        self.identity.sign_message(message).await
    }

    /// Fill sender, chain id, fees, nonce and gas limit where absent.
    ///
    /// Fees come from the gas station when one is configured and answers;
    /// any gas station failure falls back to the node's own estimate.
    pub async fn populate_transaction(
        &self,
        mut tx: TransactionRequest,
    ) -> ArianeeResult<TransactionRequest> {
        let from = self.identity.address();
        tx.from = Some(from);
        tx.chain_id.get_or_insert(self.chain_id);

        if self.legacy_transactions {
            tx.transaction_type = Some(0);
            tx.max_fee_per_gas = None;
            tx.max_priority_fee_per_gas = None;
        }

        let has_fees = tx.gas_price.is_some() || tx.max_fee_per_gas.is_some();
        if !has_fees {
            if let Some(price) = self.gas_station_price().await {
                match price {
                    GasPrice::Legacy { gas_price } => tx.gas_price = Some(gas_price),
                    GasPrice::Eip1559 {
                        max_fee,
                        max_priority_fee,
                    } if !self.legacy_transactions => {
                        tx.max_fee_per_gas = Some(max_fee);
                        tx.max_priority_fee_per_gas = Some(max_priority_fee);
                    }
                    GasPrice::Eip1559 { max_fee, .. } => tx.gas_price = Some(max_fee),
                }
            }
        }

        if tx.gas_price.is_none() && tx.max_fee_per_gas.is_none() {
            if self.legacy_transactions {
                tx.gas_price = Some(self.provider.get_gas_price().await.map_err(ArianeeError::rpc)?);
            } else {
                let fees = self
                    .provider
                    .estimate_eip1559_fees()
                    .await
                    .map_err(ArianeeError::rpc)?;
                tx.max_fee_per_gas = Some(fees.max_fee_per_gas);
                tx.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
            }
        }

        if tx.nonce.is_none() {
            let nonce = self
                .provider
                .get_transaction_count(from)
                .pending()
                .await
                .map_err(ArianeeError::rpc)?;
            tx.nonce = Some(nonce);
        }

        if tx.gas.is_none() {
            let gas = self
                .provider
                .estimate_gas(tx.clone())
                .await
                .map_err(ArianeeError::rpc)?;
            tx.gas = Some(gas);
        }

        Ok(tx)
    }

    async fn gas_station_price(&self) -> Option<GasPrice> {
        let station = self.gas_station.as_ref()?;
        match station.fetch_gas_price().await {
            Ok(price) => {
                debug!(url = station.url(), ?price, "gas station quote");
                Some(price)
            }
            Err(e) => {
                warn!(url = station.url(), error = %e, "gas station unavailable; using node estimate");
                None
            }
        }
    }

    /// Populate, sign through the identity, and broadcast.
    pub async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> ArianeeResult<PendingTransactionBuilder<Ethereum>> {
        let tx = self.populate_transaction(tx).await?;
        let raw = self.identity.sign_transaction(tx).await?;

        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| ArianeeError::TransactionFailed(e.to_string()))?;

        debug!(tx_hash = %pending.tx_hash(), from = %self.address(), "transaction submitted");
        Ok(pending)
    }

    /// Execute `tx` as an `eth_call` from this identity, without state change.
    pub async fn simulate(&self, mut tx: TransactionRequest) -> ArianeeResult<()> {
        tx.from = Some(self.identity.address());
        self.provider
            .call(tx)
            .await
            .map(|_| ())
            .map_err(ArianeeError::contract)
    }
}
