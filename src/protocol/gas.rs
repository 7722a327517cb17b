// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas-price oracle ("gas station") client.

use serde::Deserialize;

use crate::error::{ArianeeError, ArianeeResult};
use crate::fetch::{FetchLike, FetchRequest, HttpFetcher};

const WEI_PER_GWEI: f64 = 1_000_000_000.0;

/// Recommended fee, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPrice {
    Legacy { gas_price: u128 },
    Eip1559 { max_fee: u128, max_priority_fee: u128 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Eip1559Quote {
    max_fee: f64,
    max_priority_fee: f64,
}

/// Accepts `{"fast": <gwei>}` and `{"standard": {"maxFee", "maxPriorityFee"}}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GasStationResponse {
    Eip1559 { standard: Eip1559Quote },
    Legacy { fast: f64 },
}

fn gwei_to_wei(gwei: f64) -> ArianeeResult<u128> {
    if !gwei.is_finite() || gwei < 0.0 {
        return Err(ArianeeError::ContentParse(format!("invalid gas price {gwei}")));
    }
    Ok((gwei * WEI_PER_GWEI).round() as u128)
}

/// Parse a gas station body.
pub fn parse_gas_station_response(body: &str) -> ArianeeResult<GasPrice> {
    let response: GasStationResponse =
        serde_json::from_str(body).map_err(|e| ArianeeError::ContentParse(e.to_string()))?;

    match response {
        GasStationResponse::Legacy { fast } => Ok(GasPrice::Legacy {
            gas_price: gwei_to_wei(fast)?,
        }),
        GasStationResponse::Eip1559 { standard } => Ok(GasPrice::Eip1559 {
            max_fee: gwei_to_wei(standard.max_fee)?,
            max_priority_fee: gwei_to_wei(standard.max_priority_fee)?,
        }),
    }
}

/// Oracle endpoint plus the fetcher used to query it.
#[derive(Clone)]
pub struct GasStation<F = HttpFetcher> {
    url: String,
    fetcher: F,
}

impl<F: FetchLike> GasStation<F> {
    pub fn new(url: impl Into<String>, fetcher: F) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query the oracle. Retries are handled by the fetcher.
    pub async fn fetch_gas_price(&self) -> ArianeeResult<GasPrice> {
        let response = self
            .fetcher
            .fetch(FetchRequest::get(self.url.as_str()))
            .await?
            .error_for_status(&self.url)?;
        parse_gas_station_response(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::cached::tests::CountingFetcher;

    #[test]
    fn parses_legacy_quote() {
        let price = parse_gas_station_response(r#"{"safeLow": 1, "standard": 2, "fast": 30.5}"#);
        assert_eq!(
            price.unwrap(),
            GasPrice::Legacy {
                gas_price: 30_500_000_000
            }
        );
    }

    #[test]
    fn parses_eip1559_quote() {
        let body = r#"{"standard": {"maxFee": 35.1, "maxPriorityFee": 30}, "fast": {"maxFee": 40, "maxPriorityFee": 35}}"#;
        assert_eq!(
            parse_gas_station_response(body).unwrap(),
            GasPrice::Eip1559 {
                max_fee: 35_100_000_000,
                max_priority_fee: 30_000_000_000
            }
        );
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert!(parse_gas_station_response(r#"{"slow": 1}"#).is_err());
        assert!(parse_gas_station_response("not json").is_err());
        assert!(parse_gas_station_response(r#"{"fast": -1}"#).is_err());
    }

    #[tokio::test]
    async fn surfaces_http_failures() {
        let station = GasStation::new("https://gas.example", CountingFetcher::new(503, ""));
        let err = station.fetch_gas_price().await.unwrap_err();
        assert!(matches!(err, ArianeeError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn fetches_quote() {
        let station = GasStation::new("https://gas.example", CountingFetcher::new(200, r#"{"fast": 1}"#));
        assert_eq!(
            station.fetch_gas_price().await.unwrap(),
            GasPrice::Legacy {
                gas_price: 1_000_000_000
            }
        );
    }
}
