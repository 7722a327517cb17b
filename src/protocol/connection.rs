// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Slug → live, version-tagged contract handles.

use std::sync::Arc;

use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use tracing::{debug, info};

use super::contracts::{
    ArianeeAria, ArianeeCreditHistory, ArianeeCreditManager, ArianeeCreditNotePool, ArianeeEvent,
    ArianeeEventHub, ArianeeIdentity, ArianeeIssuerProxy, ArianeeLost, ArianeeMessage,
    ArianeeMessageHub, ArianeeOwnershipRegistry, ArianeeRulesManager, ArianeeSmartAsset,
    ArianeeSmartAssetV2, ArianeeStore, ArianeeUpdate, ArianeeUserAction, ArianeeWhitelist,
};
use super::details::{ProtocolDetails, ProtocolDetailsV1, ProtocolDetailsV2};
use super::gas::GasStation;
use super::resolver::{ApiProtocolDetailsResolver, ProtocolDetailsResolver};
use super::signer::IdentitySigner;
use crate::config::{SdkConfig, TransactionStrategy, DEFAULT_LEGACY_CHAIN_IDS};
use crate::error::{ArianeeError, ArianeeResult};
use crate::fetch::HttpFetcher;
use crate::signing::SigningIdentity;

/// Client-level settings shared by every connection.
#[derive(Clone)]
pub struct ProtocolClientOptions {
    /// How the write wrapper resolves submitted transactions.
    pub transaction_strategy: TransactionStrategy,
    /// Chains on which transactions are forced to type 0.
    pub legacy_chain_ids: Vec<u64>,
    /// Fetcher used for gas station queries.
    pub fetcher: HttpFetcher,
}

impl Default for ProtocolClientOptions {
    fn default() -> Self {
        Self {
            transaction_strategy: TransactionStrategy::default(),
            legacy_chain_ids: DEFAULT_LEGACY_CHAIN_IDS.to_vec(),
            fetcher: HttpFetcher::default(),
        }
    }
}

impl ProtocolClientOptions {
    /// Default options with the gas station fetcher built from `config`.
    pub fn from_config(config: &SdkConfig) -> ArianeeResult<Self> {
        Ok(Self {
            fetcher: HttpFetcher::from_config(config)?,
            ..Self::default()
        })
    }
}

/// Entry point for protocol access on behalf of one identity.
///
/// The client caches nothing: every [`connect`](Self::connect) resolves the
/// slug again.
pub struct ProtocolClient<S, R = ApiProtocolDetailsResolver> {
    identity: Arc<S>,
    resolver: R,
    options: ProtocolClientOptions,
}

impl<S: SigningIdentity> ProtocolClient<S> {
    /// Client resolving slugs through `config.api_url`, with every HTTP
    /// request bounded by the configured timeout and attempts.
    pub fn from_config(identity: Arc<S>, config: &SdkConfig) -> ArianeeResult<Self> {
        Ok(Self::with_options(
            identity,
            ApiProtocolDetailsResolver::from_config(config)?,
            ProtocolClientOptions::from_config(config)?,
        ))
    }
}

impl<S: SigningIdentity, R: ProtocolDetailsResolver> ProtocolClient<S, R> {
    pub fn new(identity: Arc<S>, resolver: R) -> Self {
        Self::with_options(identity, resolver, ProtocolClientOptions::default())
    }

    pub fn with_options(identity: Arc<S>, resolver: R, options: ProtocolClientOptions) -> Self {
        Self {
            identity,
            resolver,
            options,
        }
    }

    pub fn identity(&self) -> &Arc<S> {
        &self.identity
    }

    pub fn options(&self) -> &ProtocolClientOptions {
        &self.options
    }

    pub fn transaction_strategy(&self) -> TransactionStrategy {
        self.options.transaction_strategy
    }

    /// Resolve `slug` and bind every contract role of the deployment.
    ///
    /// No RPC request is made here; bindings are lazy proxies.
    pub async fn connect(&self, slug: &str) -> ArianeeResult<ProtocolConnection<S>> {
        let details = self.resolver.resolve(slug).await?;
        info!(
            slug,
            protocol_version = details.protocol_version(),
            chain_id = details.chain_id(),
            "protocol resolved"
        );

        let url: url::Url = details.http_provider().parse().map_err(|e: url::ParseError| {
            ArianeeError::InvalidRpcUrl(format!("{}: {e}", details.http_provider()))
        })?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url)
            .erased();

        let chain_id = details.chain_id();
        let gas_station = details
            .gas_station()
            .map(|url| GasStation::new(url, self.options.fetcher.clone()));
        let legacy = self.options.legacy_chain_ids.contains(&chain_id);
        let signer = IdentitySigner::new(
            Arc::clone(&self.identity),
            provider.clone(),
            chain_id,
            gas_station,
            legacy,
        );

        let connection = match details {
            ProtocolDetails::V1(details) => ProtocolConnection::V1(ProtocolV1Connection::new(
                slug, details, provider, signer,
            )),
            ProtocolDetails::V2(details) => ProtocolConnection::V2(ProtocolV2Connection::new(
                slug, details, provider, signer,
            )?),
        };
        debug!(slug, legacy_transactions = legacy, "protocol connection ready");
        Ok(connection)
    }
}

// =============================================================================
// V1
// =============================================================================

/// One binding per V1 contract role.
pub struct V1Contracts {
    pub aria: ArianeeAria::ArianeeAriaInstance<DynProvider>,
    pub credit_history: ArianeeCreditHistory::ArianeeCreditHistoryInstance<DynProvider>,
    pub event: ArianeeEvent::ArianeeEventInstance<DynProvider>,
    pub identity: ArianeeIdentity::ArianeeIdentityInstance<DynProvider>,
    pub smart_asset: ArianeeSmartAsset::ArianeeSmartAssetInstance<DynProvider>,
    pub store: ArianeeStore::ArianeeStoreInstance<DynProvider>,
    pub whitelist: ArianeeWhitelist::ArianeeWhitelistInstance<DynProvider>,
    pub lost: ArianeeLost::ArianeeLostInstance<DynProvider>,
    pub message: ArianeeMessage::ArianeeMessageInstance<DynProvider>,
    pub user_action: ArianeeUserAction::ArianeeUserActionInstance<DynProvider>,
    pub update: ArianeeUpdate::ArianeeUpdateInstance<DynProvider>,
    pub issuer_proxy: Option<ArianeeIssuerProxy::ArianeeIssuerProxyInstance<DynProvider>>,
    pub credit_note_pool: Option<ArianeeCreditNotePool::ArianeeCreditNotePoolInstance<DynProvider>>,
}

impl V1Contracts {
    fn bind(details: &ProtocolDetailsV1, provider: &DynProvider) -> Self {
        let a = &details.contract_addresses;
        let p = || provider.clone();
        Self {
            aria: ArianeeAria::new(a.aria, p()),
            credit_history: ArianeeCreditHistory::new(a.credit_history, p()),
            event: ArianeeEvent::new(a.event_arianee, p()),
            identity: ArianeeIdentity::new(a.identity, p()),
            smart_asset: ArianeeSmartAsset::new(a.smart_asset, p()),
            store: ArianeeStore::new(a.store, p()),
            whitelist: ArianeeWhitelist::new(a.whitelist, p()),
            lost: ArianeeLost::new(a.lost, p()),
            message: ArianeeMessage::new(a.message, p()),
            user_action: ArianeeUserAction::new(a.user_action, p()),
            update: ArianeeUpdate::new(a.update_smart_assets, p()),
            issuer_proxy: a
                .issuer_proxy
                .map(|address| ArianeeIssuerProxy::new(address, p())),
            credit_note_pool: a
                .credit_note_pool
                .map(|address| ArianeeCreditNotePool::new(address, p())),
        }
    }
}

pub struct ProtocolV1Connection<S> {
    slug: String,
    details: ProtocolDetailsV1,
    provider: DynProvider,
    signer: IdentitySigner<S>,
    pub contracts: V1Contracts,
}

impl<S: SigningIdentity> ProtocolV1Connection<S> {
    fn new(
        slug: &str,
        details: ProtocolDetailsV1,
        provider: DynProvider,
        signer: IdentitySigner<S>,
    ) -> Self {
        let contracts = V1Contracts::bind(&details, &provider);
        Self {
            slug: slug.to_string(),
            details,
            provider,
            signer,
            contracts,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn details(&self) -> &ProtocolDetailsV1 {
        &self.details
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn signer(&self) -> &IdentitySigner<S> {
        &self.signer
    }
}

// =============================================================================
// V2
// =============================================================================

/// One binding per V2 contract role.
pub struct V2Contracts {
    pub nft: ArianeeSmartAssetV2::ArianeeSmartAssetV2Instance<DynProvider>,
    pub ownership_registry: ArianeeOwnershipRegistry::ArianeeOwnershipRegistryInstance<DynProvider>,
    pub event_hub: ArianeeEventHub::ArianeeEventHubInstance<DynProvider>,
    pub message_hub: ArianeeMessageHub::ArianeeMessageHubInstance<DynProvider>,
    pub rules_manager: ArianeeRulesManager::ArianeeRulesManagerInstance<DynProvider>,
    pub credit_manager: ArianeeCreditManager::ArianeeCreditManagerInstance<DynProvider>,
}

impl V2Contracts {
    fn bind(details: &ProtocolDetailsV2, provider: &DynProvider) -> Self {
        let a = &details.contract_addresses;
        let p = || provider.clone();
        Self {
            nft: ArianeeSmartAssetV2::new(a.nft, p()),
            ownership_registry: ArianeeOwnershipRegistry::new(a.ownership_registry, p()),
            event_hub: ArianeeEventHub::new(a.event_hub, p()),
            message_hub: ArianeeMessageHub::new(a.message_hub, p()),
            rules_manager: ArianeeRulesManager::new(a.rules_manager, p()),
            credit_manager: ArianeeCreditManager::new(a.credit_manager, p()),
        }
    }
}

pub struct ProtocolV2Connection<S> {
    slug: String,
    details: ProtocolDetailsV2,
    provider: DynProvider,
    signer: IdentitySigner<S>,
    pub contracts: V2Contracts,
}

impl<S: SigningIdentity> ProtocolV2Connection<S> {
    fn new(
        slug: &str,
        details: ProtocolDetailsV2,
        provider: DynProvider,
        signer: IdentitySigner<S>,
    ) -> ArianeeResult<Self> {
        let missing = details.nft_interfaces.missing_required();
        if !missing.is_empty() {
            return Err(ArianeeError::CheckV2NftInterface {
                slug: slug.to_string(),
                missing,
            });
        }

        let contracts = V2Contracts::bind(&details, &provider);
        Ok(Self {
            slug: slug.to_string(),
            details,
            provider,
            signer,
            contracts,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn details(&self) -> &ProtocolDetailsV2 {
        &self.details
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn signer(&self) -> &IdentitySigner<S> {
        &self.signer
    }
}

// =============================================================================
// Tagged connection
// =============================================================================

/// A connection to either protocol generation.
pub enum ProtocolConnection<S> {
    V1(ProtocolV1Connection<S>),
    V2(ProtocolV2Connection<S>),
}

impl<S: SigningIdentity> ProtocolConnection<S> {
    pub fn slug(&self) -> &str {
        match self {
            ProtocolConnection::V1(c) => c.slug(),
            ProtocolConnection::V2(c) => c.slug(),
        }
    }

    pub fn protocol_version(&self) -> &str {
        match self {
            ProtocolConnection::V1(c) => &c.details.protocol_version,
            ProtocolConnection::V2(c) => &c.details.protocol_version,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            ProtocolConnection::V1(c) => c.details.chain_id,
            ProtocolConnection::V2(c) => c.details.chain_id,
        }
    }

    pub fn provider(&self) -> &DynProvider {
        match self {
            ProtocolConnection::V1(c) => c.provider(),
            ProtocolConnection::V2(c) => c.provider(),
        }
    }

    pub fn signer(&self) -> &IdentitySigner<S> {
        match self {
            ProtocolConnection::V1(c) => c.signer(),
            ProtocolConnection::V2(c) => c.signer(),
        }
    }

    /// The V1 connection, or [`ArianeeError::UnavailableFeature`] naming `feature`.
    pub fn v1(&self, feature: &str) -> ArianeeResult<&ProtocolV1Connection<S>> {
        match self {
            ProtocolConnection::V1(c) => Ok(c),
            ProtocolConnection::V2(c) => Err(ArianeeError::UnavailableFeature {
                feature: feature.to_string(),
                version: c.details.protocol_version.clone(),
            }),
        }
    }

    /// The V2 connection, or [`ArianeeError::UnavailableFeature`] naming `feature`.
    pub fn v2(&self, feature: &str) -> ArianeeResult<&ProtocolV2Connection<S>> {
        match self {
            ProtocolConnection::V2(c) => Ok(c),
            ProtocolConnection::V1(c) => Err(ArianeeError::UnavailableFeature {
                feature: feature.to_string(),
                version: c.details.protocol_version.clone(),
            }),
        }
    }

    /// Address of the ERC-721 smart-asset contract.
    pub fn smart_asset_address(&self) -> Address {
        match self {
            ProtocolConnection::V1(c) => *c.contracts.smart_asset.address(),
            ProtocolConnection::V2(c) => *c.contracts.nft.address(),
        }
    }

    pub async fn owner_of(&self, token_id: u64) -> ArianeeResult<Address> {
        let token_id = U256::from(token_id);
        let owner = match self {
            ProtocolConnection::V1(c) => c.contracts.smart_asset.ownerOf(token_id).call().await,
            ProtocolConnection::V2(c) => c.contracts.nft.ownerOf(token_id).call().await,
        };
        owner.map_err(ArianeeError::contract)
    }

    pub async fn get_approved(&self, token_id: u64) -> ArianeeResult<Address> {
        let token_id = U256::from(token_id);
        let approved = match self {
            ProtocolConnection::V1(c) => c.contracts.smart_asset.getApproved(token_id).call().await,
            ProtocolConnection::V2(c) => c.contracts.nft.getApproved(token_id).call().await,
        };
        approved.map_err(ArianeeError::contract)
    }

    pub async fn token_uri(&self, token_id: u64) -> ArianeeResult<String> {
        let token_id = U256::from(token_id);
        let uri = match self {
            ProtocolConnection::V1(c) => c.contracts.smart_asset.tokenURI(token_id).call().await,
            ProtocolConnection::V2(c) => c.contracts.nft.tokenURI(token_id).call().await,
        };
        uri.map_err(ArianeeError::contract)
    }

    /// Chain id reported by the node, for sanity checks against the details.
    pub async fn remote_chain_id(&self) -> ArianeeResult<u64> {
        self.provider().get_chain_id().await.map_err(ArianeeError::rpc)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::details::tests::{v1_json, v2_json};
    use crate::protocol::resolver::StaticProtocolDetailsResolver;
    use crate::protocol::signer::tests::RpcStub;
    use crate::signing::Core;

    pub(crate) const STUB_PASSPHRASE: &str = "kj1ed3hq3a4y";

    /// Client whose `testnet` (V1, chain 77) and `polygon-v2` (V2, chain 137)
    /// deployments both point at `stub`.
    pub(crate) fn stubbed_client(
        stub: &RpcStub,
        strategy: TransactionStrategy,
    ) -> ProtocolClient<Core, StaticProtocolDetailsResolver> {
        let mut v1 = v1_json("1.5");
        v1["httpProvider"] = json!(stub.url);
        v1["gasStation"] = json!(stub.gas_station_url());
        let mut v2 = v2_json(json!({"ERC721": true, "SmartAsset": true}));
        v2["httpProvider"] = json!(stub.url);

        let resolver = StaticProtocolDetailsResolver::from_json([
            ("testnet".to_string(), v1),
            ("polygon-v2".to_string(), v2),
        ])
        .unwrap();
        let options = ProtocolClientOptions {
            transaction_strategy: strategy,
            ..Default::default()
        };
        ProtocolClient::with_options(
            Arc::new(Core::from_passphrase(STUB_PASSPHRASE).unwrap()),
            resolver,
            options,
        )
    }

    fn client() -> ProtocolClient<Core, StaticProtocolDetailsResolver> {
        let mut v1_5 = v1_json("1.5");
        v1_5["contractAdresses"]["issuerProxy"] =
            json!("0x000000000000000000000000000000000000000c");

        let resolver = StaticProtocolDetailsResolver::from_json([
            ("testnet".to_string(), v1_json("1.0")),
            ("testnet-1.5".to_string(), v1_5),
            (
                "polygon-v2".to_string(),
                v2_json(json!({"ERC721": true, "SmartAsset": true})),
            ),
            (
                "broken-v2".to_string(),
                v2_json(json!({"SmartAsset": true})),
            ),
        ])
        .unwrap();
        ProtocolClient::new(Arc::new(Core::random()), resolver)
    }

    #[test]
    fn from_config_carries_fetch_settings() {
        let config = SdkConfig {
            fetch_timeout: std::time::Duration::from_millis(1500),
            fetch_attempts: 2,
            ..SdkConfig::default()
        };
        let client = ProtocolClient::from_config(Arc::new(Core::random()), &config).unwrap();

        assert_eq!(client.options().fetcher.timeout(), config.fetch_timeout);
        assert_eq!(client.options().fetcher.retry_policy().max_attempts, 2);
        assert_eq!(
            client.options().legacy_chain_ids,
            DEFAULT_LEGACY_CHAIN_IDS.to_vec()
        );
        assert_eq!(client.resolver.fetcher().timeout(), config.fetch_timeout);
        assert_eq!(client.resolver.api_url(), config.api_url);
    }

    #[tokio::test]
    async fn v1_slug_yields_v1_roles() {
        let connection = client().connect("testnet").await.unwrap();
        let v1 = connection.v1("test").unwrap();
        assert_eq!(connection.protocol_version(), "1.0");
        assert_eq!(
            connection.smart_asset_address(),
            "0x0000000000000000000000000000000000000005"
                .parse::<Address>()
                .unwrap()
        );
        assert!(v1.contracts.issuer_proxy.is_none());
        assert!(v1.contracts.credit_note_pool.is_none());
        // chain 77 only accepts legacy transactions
        assert!(v1.signer().uses_legacy_transactions());
    }

    #[tokio::test]
    async fn optional_v1_roles_bound_when_present() {
        let connection = client().connect("testnet-1.5").await.unwrap();
        let ProtocolConnection::V1(v1) = connection else {
            panic!("expected V1");
        };
        assert!(v1.contracts.issuer_proxy.is_some());
        assert!(v1.contracts.credit_note_pool.is_none());
    }

    #[tokio::test]
    async fn v2_slug_yields_v2_roles() {
        let connection = client().connect("polygon-v2").await.unwrap();
        assert_eq!(connection.chain_id(), 137);
        let v2 = connection.v2("test").unwrap();
        assert_eq!(
            *v2.contracts.event_hub.address(),
            "0x00000000000000000000000000000000000000a3"
                .parse::<Address>()
                .unwrap()
        );
        assert!(!v2.signer().uses_legacy_transactions());

        let err = connection.v1("credit history").err().unwrap();
        assert!(matches!(
            err,
            ArianeeError::UnavailableFeature { ref feature, ref version }
                if feature == "credit history" && version == "2.0"
        ));
    }

    #[tokio::test]
    async fn incomplete_v2_interfaces_are_rejected() {
        let err = client().connect("broken-v2").await.err().unwrap();
        assert!(err.to_string().starts_with("CheckV2NftInterfaceError"));
        assert!(matches!(
            err,
            ArianeeError::CheckV2NftInterface { ref missing, .. } if missing == &["ERC721".to_string()]
        ));
    }

    #[tokio::test]
    async fn unknown_slug_surfaces_resolver_error() {
        let err = client().connect("nowhere").await.err().unwrap();
        assert_eq!(err.error_code(), "protocol_details");
    }

    #[tokio::test]
    async fn signer_reports_identity_address() {
        let client = client();
        let connection = client.connect("testnet").await.unwrap();
        assert_eq!(connection.signer().address(), client.identity().address());
        assert_eq!(connection.signer().chain_id(), 77);
    }
}
