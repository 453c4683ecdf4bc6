//! SmallBank transaction types and requests.

use crate::identifiers::AccountId;
use crate::payload::{
    AccountPayload, AmalgamatePayload, PayloadError, TransactionPayload,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Service method used to create the account batch.
pub const CREATE_BATCH_METHOD: &str = "SmallBank_create_batch";

/// Service method used for read-only balance queries.
pub const BALANCE_METHOD: &str = "SmallBank_balance";

/// The kinds of operation the workload issues.
///
/// Discriminants are the wire-level type indices used by type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum TransactionType {
    TransactSavings = 0,
    Amalgamate = 1,
    WriteCheck = 2,
    DepositChecking = 3,
    #[serde(rename = "balance")]
    GetBalance = 4,
}

impl TransactionType {
    /// Number of distinct transaction types.
    pub const COUNT: u8 = 5;

    /// All types in index order.
    pub const ALL: [TransactionType; 5] = [
        TransactionType::TransactSavings,
        TransactionType::Amalgamate,
        TransactionType::WriteCheck,
        TransactionType::DepositChecking,
        TransactionType::GetBalance,
    ];

    /// Resolve a type index.
    ///
    /// An index outside `0..COUNT` is a contract violation and is reported
    /// rather than mapped to some default.
    pub fn from_index(index: u8) -> Result<Self, UnknownTransactionType> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(UnknownTransactionType(index.to_string()))
    }

    /// Service method name this type is submitted under.
    pub fn method(self) -> &'static str {
        match self {
            TransactionType::TransactSavings => "SmallBank_transact_savings",
            TransactionType::Amalgamate => "SmallBank_amalgamate",
            TransactionType::WriteCheck => "SmallBank_write_check",
            TransactionType::DepositChecking => "SmallBank_deposit_checking",
            TransactionType::GetBalance => BALANCE_METHOD,
        }
    }

    /// Whether this type mutates account state.
    pub fn is_write(self) -> bool {
        !matches!(self, TransactionType::GetBalance)
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            TransactionType::TransactSavings => "transact-savings",
            TransactionType::Amalgamate => "amalgamate",
            TransactionType::WriteCheck => "write-check",
            TransactionType::DepositChecking => "deposit-checking",
            TransactionType::GetBalance => "balance",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        if let Ok(index) = normalized.parse::<u8>() {
            return Self::from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.name() == normalized || (normalized == "get-balance" && *t == Self::GetBalance))
            .ok_or(UnknownTransactionType(s.to_string()))
    }
}

/// A transaction type value that does not name any known type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

/// A generated transaction with its typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Apply a signed delta to an account's savings balance.
    TransactSavings { account: AccountId, amount: i32 },
    /// Move all funds of `source` into `destination`'s checking balance.
    Amalgamate {
        source: AccountId,
        destination: AccountId,
    },
    /// Debit a check against an account.
    WriteCheck { account: AccountId, amount: i32 },
    /// Deposit into an account's checking balance.
    DepositChecking { account: AccountId, amount: i32 },
    /// Read an account's total balance.
    GetBalance { account: AccountId },
}

impl Transaction {
    /// The type of this transaction.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::TransactSavings { .. } => TransactionType::TransactSavings,
            Transaction::Amalgamate { .. } => TransactionType::Amalgamate,
            Transaction::WriteCheck { .. } => TransactionType::WriteCheck,
            Transaction::DepositChecking { .. } => TransactionType::DepositChecking,
            Transaction::GetBalance { .. } => TransactionType::GetBalance,
        }
    }

    /// Encode the parameters into the type's payload schema.
    pub fn encode_payload(&self) -> Result<Vec<u8>, PayloadError> {
        match *self {
            Transaction::TransactSavings { account, amount }
            | Transaction::WriteCheck { account, amount }
            | Transaction::DepositChecking { account, amount } => {
                TransactionPayload::new(account, amount).encode()
            }
            Transaction::Amalgamate {
                source,
                destination,
            } => AmalgamatePayload::new(source, destination).encode(),
            Transaction::GetBalance { account } => AccountPayload::new(account).encode(),
        }
    }

    /// Wrap into a request at the given position in the batch.
    pub fn into_request(self, sequence_index: usize) -> Result<TransactionRequest, PayloadError> {
        let tx_type = self.transaction_type();
        Ok(TransactionRequest {
            tx_type,
            payload: self.encode_payload()?,
            is_write: tx_type.is_write(),
            sequence_index,
        })
    }
}

/// A transaction ready for submission.
///
/// Submitted at most once; the core never retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Transaction type.
    pub tx_type: TransactionType,
    /// Encoded payload.
    pub payload: Vec<u8>,
    /// Whether the request mutates state.
    pub is_write: bool,
    /// Position in the generated batch.
    pub sequence_index: usize,
}

impl TransactionRequest {
    /// Service method to submit under.
    pub fn method(&self) -> &'static str {
        self.tx_type.method()
    }
}
