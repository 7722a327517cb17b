// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `arianee-cli`: helpers around the SDK.
//!
//! Every command is offline except `resolve`, which queries the protocol
//! details API configured through `ARIANEE_API_URL`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::error;

use arianee_sdk::access_token::{decode_jwt, is_arianee_access_token_valid};
use arianee_sdk::config::SdkConfig;
use arianee_sdk::link::read_link;
use arianee_sdk::logging::init_tracing;
use arianee_sdk::protocol::resolver::{ApiProtocolDetailsResolver, ProtocolDetailsResolver};
use arianee_sdk::transaction::decode_transaction_hex;
use arianee_sdk::{ArianeeResult, Core, SigningIdentity};

#[derive(Parser)]
#[command(name = "arianee-cli")]
#[command(version)]
#[command(about = "Arianee smart-asset protocol helpers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a certificate deep link
    ReadLink {
        /// Link URL
        url: String,
    },

    /// Decode an access token and check its signature and expiry
    DecodeToken {
        /// Token (`header.payload.signature`)
        token: String,
    },

    /// Match transaction calldata against the known contract interfaces
    DecodeTx {
        /// Calldata (hex, `0x` optional)
        calldata: String,
    },

    /// Resolve a protocol slug through the protocol details API
    Resolve {
        /// Protocol slug (e.g. `testnet`, `mainnet`)
        slug: String,
    },

    /// Print the address derived from a certificate passphrase
    Address {
        #[arg(long)]
        passphrase: String,
    },
}

async fn run(command: Commands, config: &SdkConfig) -> ArianeeResult<Value> {
    match command {
        Commands::ReadLink { url } => Ok(serde_json::to_value(read_link(&url)?)?),
        Commands::DecodeToken { token } => {
            let decoded = decode_jwt(&token)?;
            Ok(json!({
                "header": decoded.header,
                "payload": decoded.payload,
                "signature": decoded.signature,
                "valid": is_arianee_access_token_valid(&token),
            }))
        }
        Commands::DecodeTx { calldata } => {
            Ok(serde_json::to_value(decode_transaction_hex(&calldata)?)?)
        }
        Commands::Resolve { slug } => {
            let resolver = ApiProtocolDetailsResolver::from_config(config)?;
            Ok(serde_json::to_value(resolver.resolve(&slug).await?)?)
        }
        Commands::Address { passphrase } => {
            let core = Core::from_passphrase(&passphrase)?;
            Ok(json!({ "address": core.address().to_checksum(None) }))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = SdkConfig::from_env();
    init_tracing(config.log_format);

    match run(cli.command, &config).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "failed to render output");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(code = e.error_code(), error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
