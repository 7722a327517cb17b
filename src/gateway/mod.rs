// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privacy gateway client.
//!
//! Off-chain certificate content lives on privacy gateways behind a small
//! JSON-RPC surface (`certificate.read`, `event.create`, ...). Each call
//! carries an `authentification` member built from a [`GatewayAuth`], or a
//! passphrase challenge for certificate-scoped reads.

pub mod auth;
pub mod client;

pub use auth::{Authentication, GatewayAuth};
pub use client::PrivacyGatewayClient;
