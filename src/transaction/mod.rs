// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction wrapping and decoding.

pub mod decoder;
pub mod wrapper;

pub use decoder::{decode_transaction, decode_transaction_hex, DecodedTransaction};
pub use wrapper::{
    call_wrapper, transaction_wrapper, transaction_wrapper_with_strategy, PendingTransaction,
    ProtocolActions, TransactionOutcome, TxReceipt,
};
