// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response cache in front of another fetcher.
//!
//! Only requests whose URL starts with a whitelisted prefix are cached, and
//! only successful (2xx) responses are stored. Entries carry their insertion
//! time; an entry read after its time-to-live is dropped and the request is
//! sent again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FetchLike, FetchRequest, FetchResponse};
use crate::cache::KeyValueStore;
use crate::clock::now_ms;
use crate::error::ArianeeResult;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedEntry {
    inserted_at: i64,
    status: u16,
    body: String,
}

/// Caching wrapper over a [`FetchLike`].
pub struct CachedFetcher<F, K> {
    inner: F,
    store: K,
    ttl: Duration,
    prefixes: Vec<String>,
}

impl<F: FetchLike, K: KeyValueStore> CachedFetcher<F, K> {
    pub fn new(inner: F, store: K, ttl: Duration, prefixes: Vec<String>) -> Self {
        Self {
            inner,
            store,
            ttl,
            prefixes,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn is_cacheable(&self, url: &str) -> bool {
        self.prefixes.iter().any(|prefix| url.starts_with(prefix))
    }

    fn cache_key(request: &FetchRequest) -> String {
        format!(
            "fetch-cache:{} {} {}",
            request.method.as_str(),
            request.url,
            request.body.as_deref().unwrap_or("")
        )
    }

    fn lookup(&self, key: &str) -> ArianeeResult<Option<FetchResponse>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let entry: CachedEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(_) => {
                self.store.remove(key)?;
                return Ok(None);
            }
        };

        let age_ms = now_ms().saturating_sub(entry.inserted_at);
        if age_ms < 0 || (age_ms as u128) >= self.ttl.as_millis() {
            self.store.remove(key)?;
            return Ok(None);
        }

        Ok(Some(FetchResponse {
            status: entry.status,
            body: entry.body,
        }))
    }
}

impl<F: FetchLike, K: KeyValueStore> FetchLike for CachedFetcher<F, K> {
    async fn fetch(&self, request: FetchRequest) -> ArianeeResult<FetchResponse> {
        if !self.is_cacheable(&request.url) {
            return self.inner.fetch(request).await;
        }

        let key = Self::cache_key(&request);
        if let Some(response) = self.lookup(&key)? {
            debug!(url = %request.url, "fetch served from cache");
            return Ok(response);
        }

        let response = self.inner.fetch(request).await?;
        if response.is_success() {
            let entry = CachedEntry {
                inserted_at: now_ms(),
                status: response.status,
                body: response.body.clone(),
            };
            self.store.set(&key, serde_json::to_string(&entry)?)?;
        }
        Ok(response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::cache::InMemoryStore;

    /// Fetcher answering every request with a fixed response and counting calls.
    pub(crate) struct CountingFetcher {
        pub calls: AtomicUsize,
        pub status: u16,
        pub body: String,
    }

    impl CountingFetcher {
        pub(crate) fn new(status: u16, body: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status,
                body: body.to_string(),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl FetchLike for CountingFetcher {
        async fn fetch(&self, _request: FetchRequest) -> ArianeeResult<FetchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn cached(
        inner: Arc<CountingFetcher>,
        ttl: Duration,
    ) -> CachedFetcher<Arc<CountingFetcher>, InMemoryStore> {
        CachedFetcher::new(
            inner,
            InMemoryStore::default(),
            ttl,
            vec!["https://api.arianee.com/report/".to_string()],
        )
    }

    const WHITELISTED: &str = "https://api.arianee.com/report/network/protocol?q=testnet";

    #[tokio::test]
    async fn serves_second_call_from_cache() {
        let inner = Arc::new(CountingFetcher::new(200, "{}"));
        let fetcher = cached(inner.clone(), Duration::from_secs(60));

        fetcher.fetch(FetchRequest::get(WHITELISTED)).await.unwrap();
        let second = fetcher.fetch(FetchRequest::get(WHITELISTED)).await.unwrap();

        assert_eq!(second.body, "{}");
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn refetches_after_ttl() {
        let inner = Arc::new(CountingFetcher::new(200, "{}"));
        let fetcher = cached(inner.clone(), Duration::from_millis(20));

        fetcher.fetch(FetchRequest::get(WHITELISTED)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        fetcher.fetch(FetchRequest::get(WHITELISTED)).await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn ignores_urls_outside_whitelist() {
        let inner = Arc::new(CountingFetcher::new(200, "{}"));
        let fetcher = cached(inner.clone(), Duration::from_secs(60));

        for _ in 0..2 {
            fetcher
                .fetch(FetchRequest::get("https://gateway.example/rpc"))
                .await
                .unwrap();
        }
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn does_not_cache_failures() {
        let inner = Arc::new(CountingFetcher::new(500, "oops"));
        let fetcher = cached(inner.clone(), Duration::from_secs(60));

        for _ in 0..2 {
            let response = fetcher.fetch(FetchRequest::get(WHITELISTED)).await.unwrap();
            assert_eq!(response.status, 500);
        }
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn distinguishes_request_bodies() {
        let inner = Arc::new(CountingFetcher::new(200, "{}"));
        let fetcher = cached(inner.clone(), Duration::from_secs(60));

        for body in [1, 2, 1] {
            let request =
                FetchRequest::post_json(WHITELISTED, &serde_json::json!({ "n": body })).unwrap();
            fetcher.fetch(request).await.unwrap();
        }
        assert_eq!(inner.calls(), 2);
    }
}
