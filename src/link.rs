// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Certificate deep links.
//!
//! `https://<host>[/<method>]/<certificateId>,<passphrase>[,<v2-slug>][?arianeeAccessToken=<token>]`
//!
//! The host selects the network through a whitelabel table. Without a
//! method segment the link is a `requestOwnership` link.

use serde::Serialize;
use url::Url;

use crate::error::{ArianeeError, ArianeeResult};

pub const DEFAULT_LINK_METHOD: &str = "requestOwnership";
const ACCESS_TOKEN_PARAM: &str = "arianeeAccessToken";

/// Parsed deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArianeeLink {
    pub certificate_id: String,
    pub passphrase: String,
    pub method: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_v2_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arianee_access_token: Option<String>,
}

/// Hostname to network table.
#[derive(Debug, Clone)]
pub struct LinkHosts {
    entries: Vec<(String, String)>,
}

impl Default for LinkHosts {
    fn default() -> Self {
        Self {
            entries: [
                ("arian.ee", "mainnet"),
                ("test.arian.ee", "testnet"),
                ("poly.arian.ee", "polygon"),
                ("arialabs.arian.ee", "arialabs"),
            ]
            .into_iter()
            .map(|(h, n)| (h.to_string(), n.to_string()))
            .collect(),
        }
    }
}

impl LinkHosts {
    /// Add a whitelabel host, or remap an existing one.
    pub fn with_host(mut self, host: impl Into<String>, network: impl Into<String>) -> Self {
        let host = host.into().to_ascii_lowercase();
        let network = network.into();
        match self.entries.iter_mut().find(|(h, _)| *h == host) {
            Some(entry) => entry.1 = network,
            None => self.entries.push((host, network)),
        }
        self
    }

    pub fn network_for(&self, host: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h.eq_ignore_ascii_case(host))
            .map(|(_, n)| n.as_str())
    }

    /// First host registered for `network`.
    pub fn host_for(&self, network: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, n)| n == network)
            .map(|(h, _)| h.as_str())
    }

    pub fn read_link(&self, link: &str) -> ArianeeResult<ArianeeLink> {
        let url = Url::parse(link).map_err(|e| ArianeeError::InvalidLink(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| ArianeeError::InvalidLink("link has no host".into()))?;
        let network = self
            .network_for(host)
            .ok_or_else(|| ArianeeError::InvalidLink(format!("unknown link host {host}")))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let (method, credentials) = match segments.as_slice() {
            [credentials] => (DEFAULT_LINK_METHOD, *credentials),
            [method, credentials] => (*method, *credentials),
            _ => {
                return Err(ArianeeError::InvalidLink(format!(
                    "unexpected path {}",
                    url.path()
                )))
            }
        };

        let mut parts = credentials.split(',');
        let certificate_id = parts.next().unwrap_or_default();
        let passphrase = parts.next().unwrap_or_default();
        let slug = parts.next();
        if parts.next().is_some() {
            return Err(ArianeeError::InvalidLink("too many link segments".into()));
        }
        if certificate_id.is_empty() || !certificate_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArianeeError::InvalidLink(format!(
                "certificate id {certificate_id:?} is not numeric"
            )));
        }
        if passphrase.is_empty() {
            return Err(ArianeeError::InvalidLink("link has no passphrase".into()));
        }

        let arianee_access_token = url
            .query_pairs()
            .find(|(k, _)| k == ACCESS_TOKEN_PARAM)
            .map(|(_, v)| v.into_owned());

        Ok(ArianeeLink {
            certificate_id: certificate_id.to_string(),
            passphrase: passphrase.to_string(),
            method: method.to_string(),
            network: network.to_string(),
            protocol_v2_slug: slug.filter(|s| !s.is_empty()).map(str::to_string),
            arianee_access_token,
        })
    }

    pub fn create_link(&self, link: &ArianeeLink) -> ArianeeResult<String> {
        let host = self.host_for(&link.network).ok_or_else(|| {
            ArianeeError::InvalidLink(format!("no host for network {}", link.network))
        })?;

        let mut credentials = format!("{},{}", link.certificate_id, link.passphrase);
        if let Some(slug) = &link.protocol_v2_slug {
            credentials.push(',');
            credentials.push_str(slug);
        }

        let mut url = Url::parse(&format!("https://{host}"))
            .map_err(|e| ArianeeError::InvalidLink(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ArianeeError::InvalidLink("cannot build link path".into()))?;
            if link.method != DEFAULT_LINK_METHOD {
                segments.push(&link.method);
            }
            segments.push(&credentials);
        }
        if let Some(token) = &link.arianee_access_token {
            url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
        }
        Ok(url.to_string())
    }
}

/// Parse a link against the default host table.
pub fn read_link(link: &str) -> ArianeeResult<ArianeeLink> {
    LinkHosts::default().read_link(link)
}

/// Build a link against the default host table.
pub fn create_link(link: &ArianeeLink) -> ArianeeResult<String> {
    LinkHosts::default().create_link(link)
}
