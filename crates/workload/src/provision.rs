//! Account provisioning.
//!
//! Builds the single batch-creation request that creates every account in the
//! client's range before any transaction is generated.

use smallbank_types::{AccountRange, CreateAccountsPayload, PayloadError, CREATE_BATCH_METHOD};

/// A batch account-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    /// Accounts the request creates.
    pub range: AccountRange,
    /// Encoded `create-accounts` payload.
    pub payload: Vec<u8>,
}

impl CreationRequest {
    /// Service method to submit under.
    pub fn method(&self) -> &'static str {
        CREATE_BATCH_METHOD
    }

    /// Number of accounts the request creates.
    pub fn account_count(&self) -> u64 {
        self.range.len()
    }
}

/// Build the creation request for `range` with the given starting balances.
///
/// Submitting it twice for the same range makes the service reject the second
/// one as a duplicate account, which is a recognised rejection.
pub fn build_creation_request(
    range: AccountRange,
    initial_checking_balance: i64,
    initial_savings_balance: i64,
) -> Result<CreationRequest, PayloadError> {
    let payload =
        CreateAccountsPayload::new(range, initial_checking_balance, initial_savings_balance)
            .encode()?;

    Ok(CreationRequest { range, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallbank_types::payload;

    #[test]
    fn test_build_creation_request() {
        let request = build_creation_request(AccountRange::new(20, 30), 1000, 250).unwrap();

        assert_eq!(request.method(), "SmallBank_create_batch");
        assert_eq!(request.account_count(), 10);

        let decoded: CreateAccountsPayload = payload::decode(&request.payload).unwrap();
        assert_eq!(decoded.range(), AccountRange::new(20, 30));
        assert_eq!(decoded.checking_balance, 1000);
        assert_eq!(decoded.savings_balance, 250);
    }

    #[test]
    fn test_creation_request_is_deterministic() {
        let a = build_creation_request(AccountRange::new(0, 10), 1000, 1000).unwrap();
        let b = build_creation_request(AccountRange::new(0, 10), 1000, 1000).unwrap();
        assert_eq!(a, b);
    }
}
