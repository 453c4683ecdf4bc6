//! State verification by balance reconciliation.
//!
//! Every check re-queries the service; no balances are kept client-side.

use serde_json::Value;
use smallbank_core::{Transport, TransportError};
use smallbank_types::payload::{self, AccountPayload, BalanceResponse, PayloadError};
use smallbank_types::{AccountId, AccountRange, Checkpoint, ExpectedBalance, BALANCE_METHOD};
use tracing::{debug, info};

/// Checks observed balances against an expected snapshot.
pub struct StateVerifier<T> {
    transport: T,
}

impl<T: Transport> StateVerifier<T> {
    /// Create a verifier that queries through `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Query the current balance of one account.
    ///
    /// Uses the read-only balance method; never mutates state.
    pub fn query_balance(&self, account: AccountId) -> Result<i64, VerifyError> {
        let request = AccountPayload::new(account).encode()?;
        let response = self.transport.submit(BALANCE_METHOD, &request)?;

        if !response.is_success() {
            return Err(VerifyError::Response {
                account,
                status: response.status,
                body: response.body_text(),
            });
        }

        let decoded: BalanceResponse = payload::decode(&response.body)?;
        Ok(decoded.balance)
    }

    /// Verify a checkpoint.
    ///
    /// `expected` is the raw fixture value: absent, `null` or an empty list is
    /// a no-op. Otherwise it must be a list of `{account, balance}` objects.
    /// Stops at the first mismatch. Returns the number of accounts checked.
    pub fn verify(&self, checkpoint: Checkpoint, expected: Option<&Value>) -> Result<usize, VerifyError> {
        let entries = match expected {
            None | Some(Value::Null) => {
                debug!(%checkpoint, "No expected state, skipping verification");
                return Ok(0);
            }
            Some(Value::Array(entries)) => entries,
            Some(other) => return Err(VerifyError::malformed(checkpoint, other)),
        };

        for entry in entries {
            let expected =
                ExpectedBalance::from_entry(entry).ok_or_else(|| VerifyError::malformed(checkpoint, entry))?;

            let actual = self.query_balance(expected.account)?;
            if actual != expected.balance {
                return Err(VerifyError::Mismatch {
                    checkpoint,
                    account: expected.account,
                    expected: expected.balance,
                    actual,
                });
            }
        }

        info!(%checkpoint, accounts = entries.len(), "State verified");
        Ok(entries.len())
    }

    /// Query every account in `range`, in order.
    pub fn snapshot(&self, range: AccountRange) -> Result<Vec<ExpectedBalance>, VerifyError> {
        range
            .accounts()
            .map(|account| {
                self.query_balance(account)
                    .map(|balance| ExpectedBalance::new(account, balance))
            })
            .collect()
    }
}

/// Verification failures. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("{checkpoint} state should be a list of (account, balance) objects, not: {content}")]
    Malformed {
        checkpoint: Checkpoint,
        content: String,
    },

    #[error("Error in verification response for account {}: status {status}: {body}", .account.0)]
    Response {
        account: AccountId,
        status: u16,
        body: String,
    },

    #[error(
        "{checkpoint}: expected account {} to have balance {expected}, actual balance is {actual}",
        .account.0
    )]
    Mismatch {
        checkpoint: Checkpoint,
        account: AccountId,
        expected: i64,
        actual: i64,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl VerifyError {
    fn malformed(checkpoint: Checkpoint, content: &Value) -> Self {
        VerifyError::Malformed {
            checkpoint,
            content: content.to_string(),
        }
    }
}
