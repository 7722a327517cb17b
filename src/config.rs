// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! Environment variable names and default values used throughout the SDK.
//! The library never reads the environment on its own; callers (and the
//! `arianee-cli` binary) opt in through [`SdkConfig::from_env`] and hand the
//! result to `ProtocolClient::from_config` or
//! `ApiProtocolDetailsResolver::from_config`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ARIANEE_API_URL` | Base URL of the protocol details lookup | `https://api.arianee.com` |
//! | `ARIANEE_FETCH_TIMEOUT_MS` | Per-request HTTP timeout | `30000` |
//! | `ARIANEE_FETCH_RETRIES` | Max attempts for retryable HTTP failures | `3` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable name for the protocol details API base URL.
pub const ARIANEE_API_URL_ENV: &str = "ARIANEE_API_URL";

/// Environment variable name for the HTTP fetch timeout (milliseconds).
pub const FETCH_TIMEOUT_MS_ENV: &str = "ARIANEE_FETCH_TIMEOUT_MS";

/// Environment variable name for the HTTP fetch attempt count.
pub const FETCH_RETRIES_ENV: &str = "ARIANEE_FETCH_RETRIES";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default protocol details API.
pub const DEFAULT_ARIANEE_API_URL: &str = "https://api.arianee.com";

/// Default per-request HTTP timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for retryable HTTP failures.
pub const DEFAULT_FETCH_ATTEMPTS: usize = 3;

/// Validity of wallet-scoped access tokens.
pub const DEFAULT_WALLET_TOKEN_VALIDITY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Validity of certificate-scoped access tokens.
pub const DEFAULT_CERTIFICATE_TOKEN_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// Window between signing a transfer permit and its deadline.
pub const DEFAULT_SST_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Query parameter carrying a sharing token on a service-provider URL.
pub const DEFAULT_SST_QUERY_KEY: &str = "SST";

/// Chain ids that only accept legacy (type 0) transactions.
pub const DEFAULT_LEGACY_CHAIN_IDS: &[u64] = &[77, 99];

/// How the write wrapper resolves a submitted transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStrategy {
    /// Resolve as soon as the node accepted the transaction.
    ReturnTransactionHash,
    /// Resolve once the transaction is mined with one confirmation.
    #[default]
    WaitTransactionReceipt,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Environment-derived SDK settings.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub api_url: String,
    pub fetch_timeout: Duration,
    pub fetch_attempts: usize,
    pub log_format: LogFormat,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ARIANEE_API_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            log_format: LogFormat::Pretty,
        }
    }
}

impl SdkConfig {
    /// Load settings from the environment, falling back to defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup(ARIANEE_API_URL_ENV)
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let fetch_timeout = lookup(FETCH_TIMEOUT_MS_ENV)
            .and_then(|ms| ms.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.fetch_timeout);

        let fetch_attempts = lookup(FETCH_RETRIES_ENV)
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.fetch_attempts);

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            api_url,
            fetch_timeout,
            fetch_attempts,
            log_format,
        }
    }
}
