//! Logical request and response payload schemas.
//!
//! Payloads are JSON-encoded. Account identifiers are carried as decimal
//! strings in every per-account request; the batch-creation request carries
//! its bounds as plain integers.

use crate::identifiers::{AccountId, AccountRange};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors encoding or decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Payload encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Payload decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode any payload schema.
pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, PayloadError> {
    serde_json::to_vec(payload).map_err(PayloadError::Encode)
}

/// Decode any payload schema.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PayloadError> {
    serde_json::from_slice(bytes).map_err(PayloadError::Decode)
}

/// Batch account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountsPayload {
    pub from: u64,
    /// Exclusive.
    pub to: u64,
    pub checking_balance: i64,
    pub savings_balance: i64,
}

impl CreateAccountsPayload {
    pub fn new(range: AccountRange, checking_balance: i64, savings_balance: i64) -> Self {
        Self {
            from: range.from,
            to: range.to,
            checking_balance,
            savings_balance,
        }
    }

    /// The range of accounts this request creates.
    pub fn range(&self) -> AccountRange {
        AccountRange::new(self.from, self.to)
    }

    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        encode(self)
    }
}

/// Single-account request (balance query).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub account: String,
}

impl AccountPayload {
    pub fn new(account: AccountId) -> Self {
        Self {
            account: account.to_wire(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        encode(self)
    }
}

/// Account plus amount (transact-savings, write-check, deposit-checking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub account: String,
    pub amount: i32,
}

impl TransactionPayload {
    pub fn new(account: AccountId, amount: i32) -> Self {
        Self {
            account: account.to_wire(),
            amount,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        encode(self)
    }
}

/// Source and destination accounts for an amalgamate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmalgamatePayload {
    pub src_account: String,
    pub dst_account: String,
}

impl AmalgamatePayload {
    pub fn new(source: AccountId, destination: AccountId) -> Self {
        Self {
            src_account: source.to_wire(),
            dst_account: destination.to_wire(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        encode(self)
    }
}

/// Response body of a balance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: i64,
}
