// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain reads and writes the sharing-token flows depend on.
//!
//! [`SmartAssetRegistry`] is implemented for [`ProtocolClient`]; tests use
//! an in-memory registry instead.

use std::future::Future;
use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    providers::DynProvider,
    rpc::types::TransactionRequest,
};

use super::permit::{IPermit721, PermitTransfer};
use crate::config::TransactionStrategy;
use crate::error::ArianeeResult;
use crate::protocol::{
    ProtocolClient, ProtocolDetailsResolver, ProtocolV1Connection, ProtocolV2Connection,
};
use crate::signing::SigningIdentity;
use crate::transaction::{
    call_wrapper, transaction_wrapper, transaction_wrapper_with_strategy, PendingTransaction,
    ProtocolActions, TransactionOutcome,
};

/// Chain and contract holding the smart assets of a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetContract {
    pub chain_id: u64,
    pub address: Address,
}

pub trait SmartAssetRegistry: Send + Sync {
    fn asset_contract(&self, protocol: &str) -> impl Future<Output = ArianeeResult<AssetContract>>;

    fn owner_of(&self, protocol: &str, token_id: u64) -> impl Future<Output = ArianeeResult<Address>>;

    fn get_approved(
        &self,
        protocol: &str,
        token_id: u64,
    ) -> impl Future<Output = ArianeeResult<Address>>;

    /// Approve `operator` for `token_id` and wait for the receipt.
    fn approve(
        &self,
        protocol: &str,
        operator: Address,
        token_id: u64,
    ) -> impl Future<Output = ArianeeResult<()>>;

    /// Execute the transfer as a call, without changing state.
    fn simulate_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> impl Future<Output = ArianeeResult<()>>;

    fn submit_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> impl Future<Output = ArianeeResult<TransactionOutcome>>;
}

impl<G: SmartAssetRegistry> SmartAssetRegistry for Arc<G> {
    fn asset_contract(&self, protocol: &str) -> impl Future<Output = ArianeeResult<AssetContract>> {
        (**self).asset_contract(protocol)
    }

    fn owner_of(&self, protocol: &str, token_id: u64) -> impl Future<Output = ArianeeResult<Address>> {
        (**self).owner_of(protocol, token_id)
    }

    fn get_approved(
        &self,
        protocol: &str,
        token_id: u64,
    ) -> impl Future<Output = ArianeeResult<Address>> {
        (**self).get_approved(protocol, token_id)
    }

    fn approve(
        &self,
        protocol: &str,
        operator: Address,
        token_id: u64,
    ) -> impl Future<Output = ArianeeResult<()>> {
        (**self).approve(protocol, operator, token_id)
    }

    fn simulate_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> impl Future<Output = ArianeeResult<()>> {
        (**self).simulate_permit_transfer(protocol, transfer)
    }

    fn submit_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> impl Future<Output = ArianeeResult<TransactionOutcome>> {
        (**self).submit_permit_transfer(protocol, transfer)
    }
}

fn permit_transfer_request(provider: &DynProvider, transfer: &PermitTransfer) -> TransactionRequest {
    IPermit721::new(transfer.transfer_contract, provider.clone())
        .permitTransferFrom(
            transfer.permit.clone(),
            transfer.transfer_details.clone(),
            transfer.owner,
            transfer.signature.clone(),
        )
        .into_transaction_request()
}

impl<S, R> SmartAssetRegistry for ProtocolClient<S, R>
where
    S: SigningIdentity,
    R: ProtocolDetailsResolver,
{
    async fn asset_contract(&self, protocol: &str) -> ArianeeResult<AssetContract> {
        let connection = self.connect(protocol).await?;
        Ok(AssetContract {
            chain_id: connection.chain_id(),
            address: connection.smart_asset_address(),
        })
    }

    async fn owner_of(&self, protocol: &str, token_id: u64) -> ArianeeResult<Address> {
        self.connect(protocol).await?.owner_of(token_id).await
    }

    async fn get_approved(&self, protocol: &str, token_id: u64) -> ArianeeResult<Address> {
        self.connect(protocol).await?.get_approved(token_id).await
    }

    async fn approve(&self, protocol: &str, operator: Address, token_id: u64) -> ArianeeResult<()> {
        let token_id = U256::from(token_id);
        transaction_wrapper_with_strategy(
            self,
            protocol,
            ProtocolActions::new(
                async |v1: &ProtocolV1Connection<S>| -> ArianeeResult<PendingTransaction> {
                    let tx = v1
                        .contracts
                        .smart_asset
                        .approve(operator, token_id)
                        .into_transaction_request();
                    v1.signer().send_transaction(tx).await
                },
                async |v2: &ProtocolV2Connection<S>| -> ArianeeResult<PendingTransaction> {
                    let tx = v2
                        .contracts
                        .nft
                        .approve(operator, token_id)
                        .into_transaction_request();
                    v2.signer().send_transaction(tx).await
                },
            ),
            TransactionStrategy::WaitTransactionReceipt,
        )
        .await?;
        Ok(())
    }

    async fn simulate_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> ArianeeResult<()> {
        call_wrapper(
            self,
            protocol,
            ProtocolActions::new(
                async |v1: &ProtocolV1Connection<S>| -> ArianeeResult<()> {
                    v1.signer()
                        .simulate(permit_transfer_request(v1.provider(), transfer))
                        .await
                },
                async |v2: &ProtocolV2Connection<S>| -> ArianeeResult<()> {
                    v2.signer()
                        .simulate(permit_transfer_request(v2.provider(), transfer))
                        .await
                },
            ),
        )
        .await
    }

    async fn submit_permit_transfer(
        &self,
        protocol: &str,
        transfer: &PermitTransfer,
    ) -> ArianeeResult<TransactionOutcome> {
        transaction_wrapper(
            self,
            protocol,
            ProtocolActions::new(
                async |v1: &ProtocolV1Connection<S>| -> ArianeeResult<PendingTransaction> {
                    v1.signer()
                        .send_transaction(permit_transfer_request(v1.provider(), transfer))
                        .await
                },
                async |v2: &ProtocolV2Connection<S>| -> ArianeeResult<PendingTransaction> {
                    v2.signer()
                        .send_transaction(permit_transfer_request(v2.provider(), transfer))
                        .await
                },
            ),
        )
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use alloy::{
        consensus::Transaction,
        primitives::{address, Bytes, B256},
    };

    use super::*;
    use crate::error::ArianeeError;
    use crate::protocol::connection::tests::{stubbed_client, STUB_PASSPHRASE};
    use crate::protocol::signer::tests::{receipt, RpcStub, TX_HASH};
    use crate::sharing::permit::PermitData;
    use crate::signing::Core;

    const NFT: Address = address!("00000000000000000000000000000000000000a1");
    const TRANSFER_CONTRACT: Address = address!("00000000000000000000000000000000000000f1");

    /// Registry backed by in-process maps.
    pub(crate) struct MemoryRegistry {
        pub contract: AssetContract,
        pub owners: Mutex<HashMap<u64, Address>>,
        pub approvals: Mutex<HashMap<u64, Address>>,
        pub approve_calls: AtomicUsize,
        pub simulated: Mutex<Vec<PermitTransfer>>,
        pub submitted: Mutex<Vec<PermitTransfer>>,
        pub revert_reason: Mutex<Option<String>>,
    }

    impl MemoryRegistry {
        pub(crate) fn new(chain_id: u64, address: Address) -> Self {
            Self {
                contract: AssetContract { chain_id, address },
                owners: Mutex::new(HashMap::new()),
                approvals: Mutex::new(HashMap::new()),
                approve_calls: AtomicUsize::new(0),
                simulated: Mutex::new(Vec::new()),
                submitted: Mutex::new(Vec::new()),
                revert_reason: Mutex::new(None),
            }
        }

        pub(crate) fn set_owner(&self, token_id: u64, owner: Address) {
            self.owners.lock().unwrap().insert(token_id, owner);
        }
    }

    impl SmartAssetRegistry for MemoryRegistry {
        async fn asset_contract(&self, _protocol: &str) -> ArianeeResult<AssetContract> {
            Ok(self.contract)
        }

        async fn owner_of(&self, _protocol: &str, token_id: u64) -> ArianeeResult<Address> {
            self.owners
                .lock()
                .unwrap()
                .get(&token_id)
                .copied()
                .ok_or_else(|| ArianeeError::Contract("ERC721: invalid token ID".into()))
        }

        async fn get_approved(&self, _protocol: &str, token_id: u64) -> ArianeeResult<Address> {
            Ok(self
                .approvals
                .lock()
                .unwrap()
                .get(&token_id)
                .copied()
                .unwrap_or(Address::ZERO))
        }

        async fn approve(&self, _protocol: &str, operator: Address, token_id: u64) -> ArianeeResult<()> {
            self.approve_calls.fetch_add(1, Ordering::SeqCst);
            self.approvals.lock().unwrap().insert(token_id, operator);
            Ok(())
        }

        async fn simulate_permit_transfer(
            &self,
            _protocol: &str,
            transfer: &PermitTransfer,
        ) -> ArianeeResult<()> {
            self.simulated.lock().unwrap().push(transfer.clone());
            match self.revert_reason.lock().unwrap().clone() {
                Some(reason) => Err(ArianeeError::Contract(reason)),
                None => Ok(()),
            }
        }

        async fn submit_permit_transfer(
            &self,
            _protocol: &str,
            transfer: &PermitTransfer,
        ) -> ArianeeResult<TransactionOutcome> {
            self.submitted.lock().unwrap().push(transfer.clone());
            Ok(TransactionOutcome::Submitted {
                tx_hash: B256::repeat_byte(0x77),
            })
        }
    }

    fn permit_transfer() -> PermitTransfer {
        let owner = Core::from_passphrase(STUB_PASSPHRASE).unwrap().address();
        let permit = PermitData::new(NFT, 42, TRANSFER_CONTRACT, U256::from(9), 1_900_000_000);
        PermitTransfer::new(
            TRANSFER_CONTRACT,
            &permit,
            address!("00000000000000000000000000000000000000b2"),
            owner,
            Bytes::from(vec![0x11; 65]),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn approve_waits_for_receipt_regardless_of_strategy() {
        let stub = RpcStub::start().await;
        let client = stubbed_client(&stub, TransactionStrategy::ReturnTransactionHash);
        let operator = address!("00000000000000000000000000000000000000c3");

        client.approve("polygon-v2", operator, 42).await.unwrap();

        let methods = stub.methods();
        let sent = methods
            .iter()
            .position(|m| m == "eth_sendRawTransaction")
            .unwrap();
        let mined = methods
            .iter()
            .position(|m| m == "eth_getTransactionReceipt")
            .unwrap();
        assert!(sent < mined);

        let raw = stub.raw_transactions();
        assert_eq!(raw.len(), 1);
        assert!(raw[0].is_eip1559());
        assert_eq!(raw[0].to(), Some(NFT));
        assert_eq!(raw[0].input()[..4], [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[tokio::test]
    async fn approve_fails_on_reverted_receipt() {
        let stub = RpcStub::start().await;
        stub.set_result("eth_getTransactionReceipt", receipt(false));
        let client = stubbed_client(&stub, TransactionStrategy::ReturnTransactionHash);

        let err = client
            .approve("testnet", address!("00000000000000000000000000000000000000c3"), 42)
            .await
            .unwrap_err();
        assert!(matches!(err, ArianeeError::TransactionFailed(_)));
        assert!(stub.raw_transactions()[0].is_legacy());
    }

    #[tokio::test]
    async fn submit_permit_transfer_sends_permit_calldata() {
        let stub = RpcStub::start().await;
        let client = stubbed_client(&stub, TransactionStrategy::ReturnTransactionHash);
        let transfer = permit_transfer();

        let outcome = client
            .submit_permit_transfer("polygon-v2", &transfer)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransactionOutcome::Submitted {
                tx_hash: TX_HASH.parse().unwrap()
            }
        );

        let raw = stub.raw_transactions();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].to(), Some(TRANSFER_CONTRACT));
        assert_eq!(raw[0].input()[..4], [0x10, 0x5b, 0x68, 0x9e]);
        assert_eq!(raw[0].input(), &transfer.calldata());
        assert!(!stub
            .methods()
            .contains(&"eth_getTransactionReceipt".to_string()));
    }

    #[tokio::test]
    async fn simulate_permit_transfer_is_a_call() {
        let stub = RpcStub::start().await;
        let client = stubbed_client(&stub, TransactionStrategy::default());
        let transfer = permit_transfer();

        client
            .simulate_permit_transfer("polygon-v2", &transfer)
            .await
            .unwrap();

        let call = &stub.params("eth_call")[0][0];
        let input = call["input"].as_str().or(call["data"].as_str()).unwrap();
        assert!(input.starts_with("0x105b689e"));
        assert_eq!(
            call["to"].as_str().unwrap().to_lowercase(),
            format!("{TRANSFER_CONTRACT:#x}")
        );
        assert!(stub.raw_transactions().is_empty());

        stub.unset("eth_call");
        assert!(client
            .simulate_permit_transfer("polygon-v2", &transfer)
            .await
            .is_err());
    }
}
