//! Expected account state used at verification checkpoints.

use crate::identifiers::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named verification point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Checkpoint {
    /// Before the transaction body runs, right after account creation.
    Initial,
    /// After the transaction body completes.
    Final,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::Initial => f.write_str("Initial"),
            Checkpoint::Final => f.write_str("Final"),
        }
    }
}

/// One `(account, balance)` expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedBalance {
    pub account: AccountId,
    pub balance: i64,
}

impl ExpectedBalance {
    pub fn new(account: AccountId, balance: i64) -> Self {
        Self { account, balance }
    }

    /// Read an entry of a fixture list.
    ///
    /// Returns `None` unless the entry is an object carrying both an unsigned
    /// `account` and a signed 64-bit `balance`.
    pub fn from_entry(entry: &serde_json::Value) -> Option<Self> {
        let account = entry.get("account")?.as_u64()?;
        let balance = entry.get("balance")?.as_i64()?;
        Some(Self::new(AccountId(account), balance))
    }
}
