// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SDK error type.
//!
//! Every failure the SDK can surface is a variant of [`ArianeeError`].
//! Callers branch on the variant (or on [`ArianeeError::error_code`]),
//! never on the rendered message. The two exceptions are documented
//! message patterns that external tooling already greps for:
//!
//! - timeouts render as `Request timed out after <n>ms`
//! - decode failures end with `No matching interface`

use std::time::Duration;

use alloy::primitives::Address;

/// Reason a smart-asset sharing token was rejected.
///
/// Each variant names the validation state that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SstRejection {
    #[error("token could not be parsed: {0}")]
    Malformed(String),

    #[error("token subject must be 'certificate', got '{0}'")]
    NotCertificateScoped(String),

    #[error("token carries no network")]
    MissingNetwork,

    #[error("token carries no permit")]
    MissingPermit,

    #[error("token carries no permit signature")]
    MissingPermitSignature,

    #[error("permit token id {permit_token_id} does not match token subId {sub_id:?}")]
    TokenIdMismatch {
        permit_token_id: u64,
        sub_id: Option<u64>,
    },

    #[error("permit expired at {deadline} (now {now})")]
    PermitExpired { deadline: u64, now: u64 },

    #[error("permit targets contract {permitted}, expected {expected}")]
    TokenContractMismatch { permitted: Address, expected: Address },

    #[error("permit signed by {signer}, token issued by {issuer}")]
    PermitSignerMismatch { signer: Address, issuer: Address },

    #[error("asset owned by {owner}, token issued by {issuer}")]
    OwnerMismatch { owner: Address, issuer: Address },

    #[error("asset approved for {approved}, expected transfer contract {expected}")]
    TransferNotApproved { approved: Address, expected: Address },

    #[error("transfer simulation reverted: {0}")]
    DryRunFailed(String),
}

impl SstRejection {
    /// Stable snake_case code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            SstRejection::Malformed(_) => "malformed",
            SstRejection::NotCertificateScoped(_) => "not_certificate_scoped",
            SstRejection::MissingNetwork => "missing_network",
            SstRejection::MissingPermit => "missing_permit",
            SstRejection::MissingPermitSignature => "missing_permit_signature",
            SstRejection::TokenIdMismatch { .. } => "token_id_mismatch",
            SstRejection::PermitExpired { .. } => "permit_expired",
            SstRejection::TokenContractMismatch { .. } => "token_contract_mismatch",
            SstRejection::PermitSignerMismatch { .. } => "permit_signer_mismatch",
            SstRejection::OwnerMismatch { .. } => "owner_mismatch",
            SstRejection::TransferNotApproved { .. } => "transfer_not_approved",
            SstRejection::DryRunFailed(_) => "dry_run_failed",
        }
    }
}

/// Closed error type for the whole SDK.
#[derive(Debug, thiserror::Error)]
pub enum ArianeeError {
    // -------------------------------------------------------------------------
    // Configuration / capability
    // -------------------------------------------------------------------------
    #[error("unsupported protocol version '{version}' for protocol '{slug}'")]
    UnsupportedProtocolVersion { slug: String, version: String },

    #[error("CheckV2NftInterfaceError: protocol '{slug}' does not declare required NFT interfaces: {}", .missing.join(", "))]
    CheckV2NftInterface { slug: String, missing: Vec<String> },

    #[error("feature '{feature}' is not available on protocol version {version}")]
    UnavailableFeature { feature: String, version: String },

    #[error("could not resolve protocol details for '{slug}': {reason}")]
    ProtocolDetails { slug: String, reason: String },

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    // -------------------------------------------------------------------------
    // Key material
    // -------------------------------------------------------------------------
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid passphrase: {0}")]
    InvalidPassphrase(String),

    #[error("signing failed: {0}")]
    Signing(String),

    // -------------------------------------------------------------------------
    // Authentication / authorization
    // -------------------------------------------------------------------------
    #[error("malformed access token: {0}")]
    MalformedToken(String),

    #[error("invalid access token: {0}")]
    InvalidAccessToken(String),

    #[error("invalid smart asset sharing token: {0}")]
    SharingTokenRejected(SstRejection),

    #[error("cannot {operation} with {mode} authentication")]
    AuthModeUnsupported {
        operation: &'static str,
        mode: &'static str,
    },

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------
    #[error("content is not valid JSON: {0}")]
    ContentParse(String),

    #[error("content has no $schema")]
    MissingSchema,

    // -------------------------------------------------------------------------
    // Transient I/O
    // -------------------------------------------------------------------------
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("request aborted")]
    Aborted,

    #[error("privacy gateway error {code}: {message}")]
    Gateway { code: i64, message: String },

    // -------------------------------------------------------------------------
    // Chain
    // -------------------------------------------------------------------------
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    // -------------------------------------------------------------------------
    // Decode
    // -------------------------------------------------------------------------
    #[error("Transaction could not be decoded: No matching interface")]
    NoMatchingInterface,

    // -------------------------------------------------------------------------
    // Misc
    // -------------------------------------------------------------------------
    #[error("invalid link: {0}")]
    InvalidLink(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArianeeError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ArianeeError::UnsupportedProtocolVersion { .. } => "unsupported_protocol_version",
            ArianeeError::CheckV2NftInterface { .. } => "check_v2_nft_interface",
            ArianeeError::UnavailableFeature { .. } => "unavailable_feature",
            ArianeeError::ProtocolDetails { .. } => "protocol_details",
            ArianeeError::InvalidRpcUrl(_) => "invalid_rpc_url",
            ArianeeError::InvalidAddress(_) => "invalid_address",
            ArianeeError::InvalidPrivateKey(_) => "invalid_private_key",
            ArianeeError::InvalidMnemonic(_) => "invalid_mnemonic",
            ArianeeError::InvalidPassphrase(_) => "invalid_passphrase",
            ArianeeError::Signing(_) => "signing_failed",
            ArianeeError::MalformedToken(_) => "malformed_token",
            ArianeeError::InvalidAccessToken(_) => "invalid_access_token",
            ArianeeError::SharingTokenRejected(_) => "invalid_sharing_token",
            ArianeeError::AuthModeUnsupported { .. } => "auth_mode_unsupported",
            ArianeeError::ContentParse(_) => "content_parse",
            ArianeeError::MissingSchema => "missing_schema",
            ArianeeError::Http { .. } => "http_error",
            ArianeeError::Transport(_) => "transport_error",
            ArianeeError::Timeout(_) => "timeout",
            ArianeeError::Aborted => "aborted",
            ArianeeError::Gateway { .. } => "gateway_error",
            ArianeeError::Rpc(_) => "rpc_error",
            ArianeeError::Contract(_) => "contract_error",
            ArianeeError::TransactionFailed(_) => "transaction_failed",
            ArianeeError::NoMatchingInterface => "no_matching_interface",
            ArianeeError::InvalidLink(_) => "invalid_link",
            ArianeeError::Store(_) => "store_error",
            ArianeeError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the generic fetch layer may retry the request that produced
    /// this error.
    ///
    /// Only transport failures, rate limiting and server errors qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            ArianeeError::Transport(_) => true,
            ArianeeError::Http { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    pub(crate) fn contract(err: impl std::fmt::Display) -> Self {
        ArianeeError::Contract(err.to_string())
    }

    pub(crate) fn rpc(err: impl std::fmt::Display) -> Self {
        ArianeeError::Rpc(err.to_string())
    }
}

impl From<SstRejection> for ArianeeError {
    fn from(rejection: SstRejection) -> Self {
        ArianeeError::SharingTokenRejected(rejection)
    }
}

pub type ArianeeResult<T> = Result<T, ArianeeError>;
