// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Version-dispatching read and write wrappers.
//!
//! Both wrappers connect to a slug and run the callback matching the
//! connection's protocol generation. Callback errors propagate unchanged and
//! nothing here retries: resubmitting a transaction is never safe.

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::TxHash,
    providers::PendingTransactionBuilder,
    rpc::types::TransactionReceipt,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TransactionStrategy;
use crate::error::{ArianeeError, ArianeeResult};
use crate::protocol::{
    ProtocolClient, ProtocolConnection, ProtocolDetailsResolver, ProtocolV1Connection,
    ProtocolV2Connection,
};
use crate::signing::SigningIdentity;

/// Pending transaction handle returned by write callbacks.
pub type PendingTransaction = PendingTransactionBuilder<Ethereum>;

/// The pair of per-version callbacks.
pub struct ProtocolActions<A1, A2> {
    pub protocol_v1_action: A1,
    pub protocol_v2_action: A2,
}

impl<A1, A2> ProtocolActions<A1, A2> {
    pub fn new(protocol_v1_action: A1, protocol_v2_action: A2) -> Self {
        Self {
            protocol_v1_action,
            protocol_v2_action,
        }
    }
}

/// Receipt fields callers care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub effective_gas_price: u128,
    /// `gas_used * effective_gas_price`, in wei.
    pub fee: u128,
    pub success: bool,
}

impl From<&TransactionReceipt> for TxReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            fee: u128::from(receipt.gas_used).saturating_mul(receipt.effective_gas_price),
            success: ReceiptResponse::status(receipt),
        }
    }
}

/// Result of the write wrapper, depending on the strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransactionOutcome {
    Submitted { tx_hash: TxHash },
    Mined(TxReceipt),
}

impl TransactionOutcome {
    pub fn tx_hash(&self) -> TxHash {
        match self {
            TransactionOutcome::Submitted { tx_hash } => *tx_hash,
            TransactionOutcome::Mined(receipt) => receipt.tx_hash,
        }
    }
}

/// Run a read against `slug`, dispatching on the protocol generation.
pub async fn call_wrapper<S, R, T, A1, A2>(
    client: &ProtocolClient<S, R>,
    slug: &str,
    actions: ProtocolActions<A1, A2>,
) -> ArianeeResult<T>
where
    S: SigningIdentity,
    R: ProtocolDetailsResolver,
    A1: AsyncFnOnce(&ProtocolV1Connection<S>) -> ArianeeResult<T>,
    A2: AsyncFnOnce(&ProtocolV2Connection<S>) -> ArianeeResult<T>,
{
    let connection = client.connect(slug).await?;
    match &connection {
        ProtocolConnection::V1(v1) => (actions.protocol_v1_action)(v1).await,
        ProtocolConnection::V2(v2) => (actions.protocol_v2_action)(v2).await,
    }
}

/// Run a write against `slug` with the client's transaction strategy.
pub async fn transaction_wrapper<S, R, A1, A2>(
    client: &ProtocolClient<S, R>,
    slug: &str,
    actions: ProtocolActions<A1, A2>,
) -> ArianeeResult<TransactionOutcome>
where
    S: SigningIdentity,
    R: ProtocolDetailsResolver,
    A1: AsyncFnOnce(&ProtocolV1Connection<S>) -> ArianeeResult<PendingTransaction>,
    A2: AsyncFnOnce(&ProtocolV2Connection<S>) -> ArianeeResult<PendingTransaction>,
{
    transaction_wrapper_with_strategy(client, slug, actions, client.transaction_strategy()).await
}

/// Run a write against `slug` with an explicit strategy.
///
/// Under [`TransactionStrategy::WaitTransactionReceipt`] a mined but
/// reverted transaction fails with [`ArianeeError::TransactionFailed`].
pub async fn transaction_wrapper_with_strategy<S, R, A1, A2>(
    client: &ProtocolClient<S, R>,
    slug: &str,
    actions: ProtocolActions<A1, A2>,
    strategy: TransactionStrategy,
) -> ArianeeResult<TransactionOutcome>
where
    S: SigningIdentity,
    R: ProtocolDetailsResolver,
    A1: AsyncFnOnce(&ProtocolV1Connection<S>) -> ArianeeResult<PendingTransaction>,
    A2: AsyncFnOnce(&ProtocolV2Connection<S>) -> ArianeeResult<PendingTransaction>,
{
    let pending = call_wrapper(client, slug, actions).await?;
    let tx_hash = *pending.tx_hash();

    match strategy {
        TransactionStrategy::ReturnTransactionHash => {
            debug!(%tx_hash, slug, "returning on submission");
            Ok(TransactionOutcome::Submitted { tx_hash })
        }
        TransactionStrategy::WaitTransactionReceipt => {
            let receipt = pending
                .with_required_confirmations(1)
                .get_receipt()
                .await
                .map_err(|e| ArianeeError::TransactionFailed(format!("{tx_hash}: {e}")))?;
            let receipt = TxReceipt::from(&receipt);

            if !receipt.success {
                return Err(ArianeeError::TransactionFailed(format!("{tx_hash} reverted")));
            }
            info!(
                %tx_hash,
                slug,
                block_number = receipt.block_number,
                gas_used = receipt.gas_used,
                "transaction mined"
            );
            Ok(TransactionOutcome::Mined(receipt))
        }
    }
}
