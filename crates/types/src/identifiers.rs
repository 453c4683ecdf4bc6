//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier.
///
/// Unique within the full account space `[0, total_accounts * num_partitions)`.
/// On the wire it is carried as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl AccountId {
    /// Wire encoding used by every per-account request payload.
    pub fn to_wire(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.0)
    }
}

/// Client instance identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

/// Half-open range of account identifiers owned by one client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRange {
    /// First account (inclusive).
    pub from: u64,
    /// Last account (exclusive).
    pub to: u64,
}

impl AccountRange {
    /// Create a range. `to` is clamped so the range is never inverted.
    pub fn new(from: u64, to: u64) -> Self {
        Self {
            from,
            to: to.max(from),
        }
    }

    /// Number of accounts in the range.
    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    /// Whether the range holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Whether the account falls inside this range.
    pub fn contains(&self, account: AccountId) -> bool {
        (self.from..self.to).contains(&account.0)
    }

    /// The account at `offset` from the start of the range.
    ///
    /// Returns `None` if `offset` is past the end.
    pub fn account_at(&self, offset: u64) -> Option<AccountId> {
        (offset < self.len()).then(|| AccountId(self.from + offset))
    }

    /// Iterate every account in the range in ascending order.
    pub fn accounts(&self) -> impl Iterator<Item = AccountId> {
        (self.from..self.to).map(AccountId)
    }
}

impl fmt::Display for AccountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_membership() {
        let range = AccountRange::new(10, 20);
        assert_eq!(range.len(), 10);
        assert!(range.contains(AccountId(10)));
        assert!(range.contains(AccountId(19)));
        assert!(!range.contains(AccountId(20)));
        assert!(!range.contains(AccountId(9)));
    }

    #[test]
    fn test_account_at() {
        let range = AccountRange::new(5, 8);
        assert_eq!(range.account_at(0), Some(AccountId(5)));
        assert_eq!(range.account_at(2), Some(AccountId(7)));
        assert_eq!(range.account_at(3), None);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = AccountRange::new(7, 3);
        assert!(range.is_empty());
        assert_eq!(range.accounts().count(), 0);
    }

    #[test]
    fn test_wire_encoding() {
        assert_eq!(AccountId(42).to_wire(), "42");
    }
}
