// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Slug → protocol details lookup.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::details::ProtocolDetails;
use crate::config::{SdkConfig, DEFAULT_ARIANEE_API_URL};
use crate::error::{ArianeeError, ArianeeResult};
use crate::fetch::{FetchLike, FetchRequest, HttpFetcher};

/// Resolves a protocol slug. Implementations do not cache.
pub trait ProtocolDetailsResolver: Send + Sync {
    fn resolve(&self, slug: &str) -> impl Future<Output = ArianeeResult<ProtocolDetails>>;
}

/// Queries `<api>/report/network/protocol?q=<slug>`.
pub struct ApiProtocolDetailsResolver<F = HttpFetcher> {
    fetcher: F,
    api_url: String,
}

impl Default for ApiProtocolDetailsResolver<HttpFetcher> {
    fn default() -> Self {
        Self::new(HttpFetcher::default(), DEFAULT_ARIANEE_API_URL)
    }
}

impl ApiProtocolDetailsResolver<HttpFetcher> {
    /// Resolver against `config.api_url`, fetching with the configured
    /// timeout and attempt count.
    pub fn from_config(config: &SdkConfig) -> ArianeeResult<Self> {
        Ok(Self::new(HttpFetcher::from_config(config)?, config.api_url.as_str()))
    }
}

impl<F: FetchLike> ApiProtocolDetailsResolver<F> {
    pub fn new(fetcher: F, api_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn lookup_url(&self, slug: &str) -> ArianeeResult<String> {
        let mut url = url::Url::parse(&format!("{}/report/network/protocol", self.api_url))
            .map_err(|e| ArianeeError::ProtocolDetails {
                slug: slug.to_string(),
                reason: format!("invalid API URL: {e}"),
            })?;
        url.query_pairs_mut().append_pair("q", slug);
        Ok(url.to_string())
    }
}

impl<F: FetchLike> ProtocolDetailsResolver for ApiProtocolDetailsResolver<F> {
    async fn resolve(&self, slug: &str) -> ArianeeResult<ProtocolDetails> {
        let url = self.lookup_url(slug)?;
        debug!(slug, url = %url, "resolving protocol details");

        let response = self
            .fetcher
            .fetch(FetchRequest::get(url.as_str()))
            .await?
            .error_for_status(&url)?;

        let raw: Value = response.json().map_err(|e| ArianeeError::ProtocolDetails {
            slug: slug.to_string(),
            reason: e.to_string(),
        })?;
        ProtocolDetails::from_json(slug, raw)
    }
}

/// Fixed slug table, for tests and air-gapped deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticProtocolDetailsResolver {
    details: HashMap<String, ProtocolDetails>,
}

impl StaticProtocolDetailsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slug: impl Into<String>, details: ProtocolDetails) -> Self {
        self.details.insert(slug.into(), details);
        self
    }

    /// Build from raw JSON, validating each entry.
    pub fn from_json(entries: impl IntoIterator<Item = (String, Value)>) -> ArianeeResult<Self> {
        let mut resolver = Self::new();
        for (slug, raw) in entries {
            let details = ProtocolDetails::from_json(&slug, raw)?;
            resolver.details.insert(slug, details);
        }
        Ok(resolver)
    }
}

impl ProtocolDetailsResolver for StaticProtocolDetailsResolver {
    async fn resolve(&self, slug: &str) -> ArianeeResult<ProtocolDetails> {
        self.details
            .get(slug)
            .cloned()
            .ok_or_else(|| ArianeeError::ProtocolDetails {
                slug: slug.to_string(),
                reason: "unknown protocol slug".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::fetch::FetchResponse;
    use crate::protocol::details::tests::v1_json;

    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
        response: FetchResponse,
    }

    impl FetchLike for RecordingFetcher {
        async fn fetch(&self, request: FetchRequest) -> ArianeeResult<FetchResponse> {
            self.urls.lock().unwrap().push(request.url);
            Ok(self.response.clone())
        }
    }

    fn recording(status: u16, body: String) -> RecordingFetcher {
        RecordingFetcher {
            urls: Mutex::new(Vec::new()),
            response: FetchResponse { status, body },
        }
    }

    #[tokio::test]
    async fn api_resolver_queries_report_endpoint() {
        let fetcher = recording(200, v1_json("1.5").to_string());
        let resolver = ApiProtocolDetailsResolver::new(fetcher, "https://api.example.test/");

        let details = resolver.resolve("testnet sokol").await.unwrap();
        assert_eq!(details.protocol_version(), "1.5");

        let urls = resolver.fetcher.urls.lock().unwrap();
        assert_eq!(
            urls.as_slice(),
            ["https://api.example.test/report/network/protocol?q=testnet+sokol"]
        );
    }

    #[tokio::test]
    async fn api_resolver_surfaces_http_errors() {
        let resolver =
            ApiProtocolDetailsResolver::new(recording(404, String::new()), "https://api.example.test");
        let err = resolver.resolve("nope").await.unwrap_err();
        assert!(matches!(err, ArianeeError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn api_resolver_rejects_non_json() {
        let resolver =
            ApiProtocolDetailsResolver::new(recording(200, "<html>".into()), "https://api.example.test");
        let err = resolver.resolve("testnet").await.unwrap_err();
        assert_eq!(err.error_code(), "protocol_details");
    }

    #[test]
    fn from_config_uses_configured_api_and_timeout() {
        let config = SdkConfig {
            api_url: "https://api.example.test".into(),
            fetch_timeout: Duration::from_millis(1500),
            fetch_attempts: 5,
            ..SdkConfig::default()
        };
        let resolver = ApiProtocolDetailsResolver::from_config(&config).unwrap();

        assert_eq!(resolver.fetcher().timeout(), Duration::from_millis(1500));
        assert_eq!(resolver.fetcher().retry_policy().max_attempts, 5);
        assert_eq!(resolver.api_url(), "https://api.example.test");
        assert_eq!(
            resolver.lookup_url("mainnet").unwrap(),
            "https://api.example.test/report/network/protocol?q=mainnet"
        );
    }

    #[test]
    fn default_resolver_matches_default_config() {
        let resolver = ApiProtocolDetailsResolver::default();
        let config = SdkConfig::default();
        assert_eq!(resolver.api_url(), config.api_url);
        assert_eq!(resolver.fetcher().timeout(), config.fetch_timeout);
    }

    #[tokio::test]
    async fn static_resolver_lookup() {
        let resolver =
            StaticProtocolDetailsResolver::from_json([("testnet".to_string(), v1_json("1.0"))])
                .unwrap();
        assert_eq!(resolver.resolve("testnet").await.unwrap().chain_id(), 77);
        assert!(resolver.resolve("mainnet").await.is_err());
    }
}
