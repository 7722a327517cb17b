// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! reqwest-backed fetcher.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::retry::{execute_with_retry, RetryPolicy};
use super::{FetchLike, FetchMethod, FetchRequest, FetchResponse};
use crate::config::{SdkConfig, DEFAULT_FETCH_TIMEOUT};
use crate::error::{ArianeeError, ArianeeResult};

/// Default fetcher.
///
/// Each attempt races the request against a timer. When the timer wins it
/// cancels the request's abort token and the attempt fails with
/// [`ArianeeError::Timeout`]; an abort triggered by the caller fails with
/// [`ArianeeError::Aborted`]. Neither is retried.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            retry: RetryPolicy::fetch_default(),
        }
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> ArianeeResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ArianeeError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout,
            retry,
        })
    }

    pub fn from_config(config: &SdkConfig) -> ArianeeResult<Self> {
        Self::new(
            config.fetch_timeout,
            RetryPolicy {
                max_attempts: config.fetch_attempts,
                ..RetryPolicy::fetch_default()
            },
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn fetch_once(&self, request: &FetchRequest) -> ArianeeResult<FetchResponse> {
        let abort = request
            .abort
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();

        let mut builder = match request.method {
            FetchMethod::Get => self.client.get(&request.url),
            FetchMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| ArianeeError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ArianeeError::Transport(e.to_string()))?;
            Ok::<_, ArianeeError>(FetchResponse { status, body })
        };

        let timer = async {
            sleep(self.timeout).await;
            abort.cancel();
        };

        tokio::select! {
            result = exchange => {
                let response = result?;
                debug!(method = request.method.as_str(), url = %request.url, status = response.status, "fetch completed");
                response.error_for_status(&request.url)
            }
            _ = timer => Err(ArianeeError::Timeout(self.timeout)),
            _ = abort.cancelled() => Err(ArianeeError::Aborted),
        }
    }
}

impl FetchLike for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> ArianeeResult<FetchResponse> {
        let label = format!("{} {}", request.method.as_str(), request.url);
        execute_with_retry(&self.retry, &label, || self.fetch_once(&request)).await
    }
}
