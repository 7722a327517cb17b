// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic HTTP fetch layer.
//!
//! Every off-chain call (protocol details, gas station, privacy gateway)
//! goes through a [`FetchLike`]. This is the only layer that retries.
//!
//! - [`HttpFetcher`]: reqwest with a cooperative timeout and bounded
//!   exponential backoff
//! - [`CachedFetcher`]: response cache for whitelisted URL prefixes

pub mod cached;
pub mod http;
pub mod retry;

use std::future::Future;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{ArianeeError, ArianeeResult};

pub use cached::CachedFetcher;
pub use http::HttpFetcher;
pub use retry::RetryPolicy;

/// HTTP verb subset used by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMethod {
    Get,
    Post,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Get => "GET",
            FetchMethod::Post => "POST",
        }
    }
}

/// Outgoing request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: FetchMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Cancelling this token aborts the request.
    pub abort: Option<CancellationToken>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: FetchMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            abort: None,
        }
    }

    /// POST with a JSON body.
    pub fn post_json<T: serde::Serialize>(url: impl Into<String>, body: &T) -> ArianeeResult<Self> {
        Ok(Self {
            method: FetchMethod::Post,
            url: url.into(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(serde_json::to_string(body)?),
            abort: None,
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }
}

/// Fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`ArianeeError::Http`].
    pub fn error_for_status(self, url: &str) -> ArianeeResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ArianeeError::Http {
                status: self.status,
                url: url.to_string(),
            })
        }
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ArianeeResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ArianeeError::ContentParse(e.to_string()))
    }
}

/// Something that can perform an HTTP request.
pub trait FetchLike: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = ArianeeResult<FetchResponse>>;
}

impl<F: FetchLike> FetchLike for std::sync::Arc<F> {
    fn fetch(&self, request: FetchRequest) -> impl Future<Output = ArianeeResult<FetchResponse>> {
        (**self).fetch(request)
    }
}
