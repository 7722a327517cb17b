// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bounded exponential backoff for retryable fetch failures.

use std::future::IntoFuture;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::ArianeeError;

/// Retry bounds.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn fetch_default() -> Self {
        Self {
            max_attempts: crate::config::DEFAULT_FETCH_ATTEMPTS,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }

    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fetch_default()
    }
}

pub(crate) fn backoff_delay(policy: &RetryPolicy, attempt: usize) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let exponent = (attempt.saturating_sub(1)).min(6) as u32;
    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor);
    let max_ms = policy.max_delay.as_millis() as u64;

    Duration::from_millis(delay_ms.min(max_ms))
}

pub(crate) async fn execute_with_retry<T, F, O>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, ArianeeError>
where
    F: FnMut() -> O,
    O: IntoFuture<Output = Result<T, ArianeeError>>,
{
    let mut attempt = 1;

    loop {
        match operation().into_future().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts || !err.is_retryable() {
                    return Err(err);
                }

                let delay = backoff_delay(policy, attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "{} failed; retrying",
                    label
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
